use std::sync::Arc;

use sea_orm::DatabaseConnection;
use service::user::repo::seaorm::SeaOrmUserRepository;
use service::user::repository::UserRepository;
use service::UserService;

pub type SharedUserService = Arc<UserService<dyn UserRepository>>;

#[derive(Clone)]
pub struct ServerState {
    pub users: SharedUserService,
}

impl ServerState {
    pub fn new(users: SharedUserService) -> Self { Self { users } }

    /// State backed by the SeaORM repository on `db`.
    pub fn from_db(db: DatabaseConnection) -> Self {
        let repo: Arc<dyn UserRepository> = Arc::new(SeaOrmUserRepository::new(db));
        Self::new(Arc::new(UserService::new(repo)))
    }
}
