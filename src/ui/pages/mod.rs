mod about;
mod collections;
mod history;
mod main_feed;
mod screenshots;
mod videos;

pub use about::AboutPage;
pub use collections::CollectionsPage;
pub use history::HistoryPage;
pub use main_feed::MainFeedPage;
pub use screenshots::ScreenshotsPage;
pub use videos::VideosPage;

use crate::gallery::types::Payload;

use super::page::Page;

/// Build the page for a freshly loaded payload.
pub fn build_page(payload: &Payload, page_size: usize) -> Box<dyn Page> {
  match payload {
    Payload::Main(feed) => Box::new(MainFeedPage::new(feed.clone())),
    Payload::Collections(data) => Box::new(CollectionsPage::new(data.clone(), page_size)),
    Payload::Screenshots(data) => Box::new(ScreenshotsPage::new(data.clone())),
    Payload::Videos(data) => Box::new(VideosPage::new(data.clone())),
    Payload::History(data) => Box::new(HistoryPage::new(data.clone())),
    Payload::About(data) => Box::new(AboutPage::new(data.clone())),
  }
}
