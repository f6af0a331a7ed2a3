// Listing and user administration use cases outside the stats session
use crate::application::platform_api::{FetchResult, PlatformApi};
use crate::domain::listing::{
    Message, Passcode, PasscodeRole, Publication, UserUpdate, page_from_cursor,
};
use crate::domain::stats::UserSummary;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct MessagePage {
    pub page: u32,
    pub messages: Vec<Message>,
    pub total_count: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublicationPage {
    pub page: u32,
    pub publications: Vec<Publication>,
    pub total_pages: u32,
    pub next_page: Option<u32>,
    pub previous_page: Option<u32>,
}

/// One locally paged slice of the full user list
#[derive(Debug, Clone, PartialEq)]
pub struct UserPage {
    pub page: u32,
    pub users: Vec<UserSummary>,
    /// Users matching the query, across all pages
    pub total_count: u64,
    pub total_pages: u32,
}

#[derive(Clone)]
pub struct ListingService {
    api: Arc<dyn PlatformApi>,
    publications_page_len: u32,
    users_page_len: u32,
}

impl ListingService {
    pub fn new(api: Arc<dyn PlatformApi>, publications_page_len: u32, users_page_len: u32) -> Self {
        Self {
            api,
            publications_page_len: publications_page_len.max(1),
            users_page_len: users_page_len.max(1),
        }
    }

    /// One page of messages, narrowed client-side by name or email
    pub async fn list_messages(&self, page: u32, query: Option<&str>) -> FetchResult<MessagePage> {
        let page = page.max(1);
        let envelope = self.api.fetch_messages(page).await?;
        let has_next = envelope.has_next();
        let has_previous = envelope.has_previous();

        let messages = match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => envelope
                .results
                .into_iter()
                .filter(|message| message.matches(query))
                .collect(),
            None => envelope.results,
        };

        Ok(MessagePage {
            page,
            messages,
            total_count: envelope.count,
            has_next,
            has_previous,
        })
    }

    pub async fn list_publications(&self, page: u32) -> FetchResult<PublicationPage> {
        let page = page.max(1);
        let envelope = self.api.fetch_publications(page).await?;

        // A page without a count keeps the single-page default
        let total_pages = if envelope.count > 0 {
            let pages = envelope.count.div_ceil(u64::from(self.publications_page_len));
            u32::try_from(pages).unwrap_or(u32::MAX)
        } else {
            1
        };

        Ok(PublicationPage {
            page,
            total_pages,
            next_page: envelope.next.as_deref().map(page_from_cursor),
            previous_page: envelope.previous.as_deref().map(page_from_cursor),
            publications: envelope.results,
        })
    }

    /// The platform returns every user at once; filtering by email or name
    /// and paging happen here. The page is clamped to the filtered range.
    pub async fn list_users(&self, page: u32, query: Option<&str>) -> FetchResult<UserPage> {
        let users = self.api.fetch_users().await?;
        let matching: Vec<UserSummary> = match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => users.into_iter().filter(|user| user.matches(query)).collect(),
            None => users,
        };

        let total_count = matching.len() as u64;
        let total_pages = u32::try_from(total_count.div_ceil(u64::from(self.users_page_len)))
            .unwrap_or(u32::MAX)
            .max(1);
        let page = page.clamp(1, total_pages);
        let skip = (page - 1) as usize * self.users_page_len as usize;

        Ok(UserPage {
            page,
            users: matching
                .into_iter()
                .skip(skip)
                .take(self.users_page_len as usize)
                .collect(),
            total_count,
            total_pages,
        })
    }

    pub async fn block_user(&self, user_id: u64) -> FetchResult<()> {
        self.api.block_user(user_id).await?;
        tracing::info!("Blocked user {}", user_id);
        Ok(())
    }

    pub async fn unblock_user(&self, user_id: u64) -> FetchResult<()> {
        self.api.unblock_user(user_id).await?;
        tracing::info!("Unblocked user {}", user_id);
        Ok(())
    }

    pub async fn update_user(&self, user_id: u64, update: &UserUpdate) -> FetchResult<UserSummary> {
        let user = self.api.update_user(user_id, update).await?;
        tracing::info!("Updated user {}", user_id);
        Ok(user)
    }

    pub async fn delete_user(&self, user_id: u64) -> FetchResult<()> {
        self.api.delete_user(user_id).await?;
        tracing::info!("Deleted user {}", user_id);
        Ok(())
    }

    pub async fn list_passcodes(&self) -> FetchResult<Vec<Passcode>> {
        self.api.fetch_passcodes().await
    }

    pub async fn create_passcode(&self, role: PasscodeRole) -> FetchResult<Passcode> {
        let passcode = self.api.create_passcode(role).await?;
        tracing::info!("Generated {:?} passcode", role);
        Ok(passcode)
    }
}
