use async_trait::async_trait;

use models::user::{Model as User, NewUser};

use crate::errors::{ServiceError, USERNAME_TAKEN};
use crate::pagination::{Page, PageRequest};

/// Repository abstraction for user persistence.
///
/// Every method is a single query or a small fixed number of them; there is
/// no cross-call transaction.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, ServiceError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError>;
    async fn exists_by_username(&self, username: &str) -> Result<bool, ServiceError>;

    async fn insert(&self, new: NewUser) -> Result<User, ServiceError>;
    /// Writes every mutable column of `user` back to its row.
    async fn update(&self, user: User) -> Result<User, ServiceError>;
    /// `false` when no row had that id.
    async fn delete_by_id(&self, id: i32) -> Result<bool, ServiceError>;

    async fn find_page(&self, req: &PageRequest) -> Result<Page<User>, ServiceError>;
    /// Substring match on username, email or phone.
    async fn search_page(&self, keyword: &str, req: &PageRequest) -> Result<Page<User>, ServiceError>;
}

/// Simple in-memory repository for tests and doc examples
pub mod mock {
    use std::cmp::Ordering;
    use std::collections::BTreeMap;
    use std::sync::{Mutex, MutexGuard};

    use chrono::Utc;
    use models::user::STATUS_ACTIVE;

    use super::*;
    use crate::pagination::{Direction, SortField};

    #[derive(Default)]
    struct Table {
        rows: BTreeMap<i32, User>,
        next_id: i32,
    }

    #[derive(Default)]
    pub struct InMemoryUserRepository {
        table: Mutex<Table>,
    }

    impl InMemoryUserRepository {
        fn table(&self) -> Result<MutexGuard<'_, Table>, ServiceError> {
            self.table.lock().map_err(|_| ServiceError::Db("user table lock poisoned".into()))
        }
    }

    fn compare(field: SortField, a: &User, b: &User) -> Ordering {
        let by_field = match field {
            SortField::Id => Ordering::Equal,
            SortField::Username => a.username.cmp(&b.username),
            SortField::Email => a.email.cmp(&b.email),
            SortField::Phone => a.phone.cmp(&b.phone),
            SortField::Nickname => a.nickname.cmp(&b.nickname),
            SortField::Status => a.status.cmp(&b.status),
            SortField::CreateTime => a.create_time.cmp(&b.create_time),
            SortField::UpdateTime => a.update_time.cmp(&b.update_time),
        };
        by_field.then(a.id.cmp(&b.id))
    }

    fn page_of(mut rows: Vec<User>, req: &PageRequest) -> Page<User> {
        rows.sort_by(|a, b| {
            let ord = compare(req.sort, a, b);
            match req.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            }
        });
        let total = rows.len() as u64;
        let content = rows
            .into_iter()
            .skip(usize::try_from(req.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(req.size).unwrap_or(usize::MAX))
            .collect();
        Page::new(content, total, req)
    }

    fn contains(field: &Option<String>, keyword: &str) -> bool {
        field.as_deref().is_some_and(|v| v.contains(keyword))
    }

    #[async_trait]
    impl UserRepository for InMemoryUserRepository {
        async fn find_by_id(&self, id: i32) -> Result<Option<User>, ServiceError> {
            Ok(self.table()?.rows.get(&id).cloned())
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
            Ok(self.table()?.rows.values().find(|u| u.username == username).cloned())
        }

        async fn exists_by_username(&self, username: &str) -> Result<bool, ServiceError> {
            Ok(self.table()?.rows.values().any(|u| u.username == username))
        }

        async fn insert(&self, new: NewUser) -> Result<User, ServiceError> {
            let mut table = self.table()?;
            if table.rows.values().any(|u| u.username == new.username) {
                return Err(ServiceError::Conflict(USERNAME_TAKEN.into()));
            }
            table.next_id += 1;
            let now = Utc::now().into();
            let user = User {
                id: table.next_id,
                username: new.username,
                password: new.password_hash,
                email: new.email,
                phone: new.phone,
                nickname: new.nickname,
                avatar: None,
                status: STATUS_ACTIVE,
                create_time: now,
                update_time: now,
            };
            table.rows.insert(user.id, user.clone());
            Ok(user)
        }

        async fn update(&self, user: User) -> Result<User, ServiceError> {
            let mut table = self.table()?;
            if table.rows.values().any(|u| u.username == user.username && u.id != user.id) {
                return Err(ServiceError::Conflict(USERNAME_TAKEN.into()));
            }
            match table.rows.get_mut(&user.id) {
                Some(row) => {
                    *row = user.clone();
                    Ok(user)
                }
                None => Err(ServiceError::not_found("user")),
            }
        }

        async fn delete_by_id(&self, id: i32) -> Result<bool, ServiceError> {
            Ok(self.table()?.rows.remove(&id).is_some())
        }

        async fn find_page(&self, req: &PageRequest) -> Result<Page<User>, ServiceError> {
            let rows = self.table()?.rows.values().cloned().collect();
            Ok(page_of(rows, req))
        }

        async fn search_page(&self, keyword: &str, req: &PageRequest) -> Result<Page<User>, ServiceError> {
            let rows = self
                .table()?
                .rows
                .values()
                .filter(|u| u.username.contains(keyword) || contains(&u.email, keyword) || contains(&u.phone, keyword))
                .cloned()
                .collect();
            Ok(page_of(rows, req))
        }
    }
}
