use cybernews::model::Article;
use cybernews::stats::{compute_statistics, ArticleStats};
use cybernews::store::Snapshot;

#[derive(Debug)]
pub struct App {
    pub view: Snapshot, // last snapshot taken from the store
    pub selected: usize,
    pub show_full: bool,
    pub notice: String,
}

impl App {
    pub fn new() -> Self {
        Self {
            view: Snapshot::default(),
            selected: 0,
            show_full: false,
            notice: "r:load  u:update  e:export  q:quit".to_string(),
        }
    }

    pub fn sync(&mut self, snapshot: Snapshot) {
        let replaced = snapshot.articles.first().map(|a| &a.id)
            != self.view.articles.first().map(|a| &a.id)
            || snapshot.articles.len() != self.view.articles.len();
        self.view = snapshot;
        if replaced {
            self.selected = 0;
        }
        if self.selected >= self.view.articles.len() {
            self.selected = self.view.articles.len().saturating_sub(1);
        }
    }

    pub fn stats(&self) -> Option<ArticleStats> {
        compute_statistics(&self.view.articles)
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.view.articles.get(self.selected)
    }

    pub fn move_down(&mut self) {
        if self.view.articles.is_empty() { return; }
        self.selected = (self.selected + 1).min(self.view.articles.len() - 1);
    }

    pub fn move_up(&mut self) {
        if self.view.articles.is_empty() { return; }
        self.selected = self.selected.saturating_sub(1);
    }
}
