use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Set, Unchanged,
};

use models::user::{self, Model as User, NewUser};

use crate::errors::ServiceError;
use crate::pagination::{Direction, Page, PageRequest, SortField};
use crate::user::repository::UserRepository;

pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    async fn fetch_page(&self, query: Select<user::Entity>, req: &PageRequest) -> Result<Page<User>, ServiceError> {
        // the paginator multiplies page by size unchecked
        req.checked_offset()?;
        let order = order_of(req.direction);
        // id breaks ties so rows with equal sort keys keep a stable position across pages
        let paginator = query
            .order_by(column_of(req.sort), order.clone())
            .order_by(user::Column::Id, order)
            .paginate(&self.db, req.size);
        let total = paginator.num_items().await?;
        let content = paginator.fetch_page(req.page).await?;
        Ok(Page::new(content, total, req))
    }
}

fn column_of(field: SortField) -> user::Column {
    match field {
        SortField::Id => user::Column::Id,
        SortField::Username => user::Column::Username,
        SortField::Email => user::Column::Email,
        SortField::Phone => user::Column::Phone,
        SortField::Nickname => user::Column::Nickname,
        SortField::Status => user::Column::Status,
        SortField::CreateTime => user::Column::CreateTime,
        SortField::UpdateTime => user::Column::UpdateTime,
    }
}

/// `%keyword%` with `\`, `%` and `_` escaped so the keyword matches literally.
fn substring_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn contains_literal(column: user::Column, pattern: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::col((user::Entity, column)).like(LikeExpr::new(pattern).escape('\\'))
}

fn order_of(direction: Direction) -> Order {
    match direction {
        Direction::Asc => Order::Asc,
        Direction::Desc => Order::Desc,
    }
}

#[async_trait::async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, ServiceError> {
        Ok(user::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
        let found = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        Ok(found)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, ServiceError> {
        let n = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .count(&self.db)
            .await?;
        Ok(n > 0)
    }

    async fn insert(&self, new: NewUser) -> Result<User, ServiceError> {
        Ok(user::create(&self.db, new).await?)
    }

    async fn update(&self, u: User) -> Result<User, ServiceError> {
        let am = user::ActiveModel {
            id: Unchanged(u.id),
            username: Set(u.username),
            password: Set(u.password),
            email: Set(u.email),
            phone: Set(u.phone),
            nickname: Set(u.nickname),
            avatar: Set(u.avatar),
            status: Set(u.status),
            create_time: Unchanged(u.create_time),
            update_time: Set(u.update_time),
        };
        match am.update(&self.db).await {
            Ok(updated) => Ok(updated),
            Err(sea_orm::DbErr::RecordNotUpdated) => Err(ServiceError::not_found("user")),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_by_id(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(user::hard_delete(&self.db, id).await?)
    }

    async fn find_page(&self, req: &PageRequest) -> Result<Page<User>, ServiceError> {
        self.fetch_page(user::Entity::find(), req).await
    }

    async fn search_page(&self, keyword: &str, req: &PageRequest) -> Result<Page<User>, ServiceError> {
        let pattern = substring_pattern(keyword);
        let matches = Condition::any()
            .add(contains_literal(user::Column::Username, &pattern))
            .add(contains_literal(user::Column::Email, &pattern))
            .add(contains_literal(user::Column::Phone, &pattern));
        self.fetch_page(user::Entity::find().filter(matches), req).await
    }
}
