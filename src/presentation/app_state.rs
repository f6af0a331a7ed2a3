// Application state for HTTP handlers
use crate::application::dashboard_session::SessionHandle;
use crate::application::listing_service::ListingService;

#[derive(Clone)]
pub struct AppState {
    pub session: SessionHandle,
    pub listings: ListingService,
    /// Page length used for the advisory activity page total
    pub activity_page_len: u32,
}
