use crate::database::contact::ContactRepository;
use crate::error::app_error::AppError;
use crate::models::dashboard::DashboardResponse;
use crate::models::notice::Notice;
use crate::models::user::User;

pub struct DashboardService<'a, R> {
    repository: &'a R,
}

impl<'a, R: ContactRepository> DashboardService<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    pub async fn dashboard(&self, user: &User, notice: Option<Notice>) -> Result<DashboardResponse, AppError> {
        let contacts = self.repository.list_contact_usernames(user.id).await?;

        Ok(DashboardResponse {
            username: user.username.clone(),
            is_admin: user.is_admin,
            contacts,
            notice,
        })
    }
}
