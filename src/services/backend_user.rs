use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{
    JwtService, MIN_PASSWORD_LENGTH, PasswordScheme, TokenSubject, generate_password,
    verify_password,
};
use crate::entities::{backend_user, prelude::*, role};
use crate::error::{AppError, AppResult};
use crate::pagination::{Page, PageQuery};
use crate::services::now;
use crate::services::status::{Status, require_non_empty};

#[derive(Debug, Clone, Deserialize)]
pub struct BackendUserInput {
    pub username: String,
    pub email: String,
    pub role_id: i32,
}

/// Account as shown to administrators, with its role joined in.
#[derive(Debug, Clone, Serialize)]
pub struct BackendUserView {
    #[serde(flatten)]
    pub user: backend_user::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_display: Option<String>,
}

impl BackendUserView {
    fn new(user: backend_user::Model, role: Option<role::Model>) -> Self {
        let (role_name, role_display) = match role {
            Some(role) => (Some(role.name), Some(role.display_name)),
            None => (None, None),
        };
        Self {
            user,
            role_name,
            role_display,
        }
    }
}

/// Returned once, when an account is created: the only time its secret is visible.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedUser {
    pub user: BackendUserView,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordReset {
    pub id: i32,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role_id: i32,
    pub role: String,
    pub role_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

#[derive(Clone)]
pub struct BackendUserService {
    db: DatabaseConnection,
    jwt: JwtService,
    scheme: PasswordScheme,
}

impl BackendUserService {
    pub fn new(db: DatabaseConnection, jwt: JwtService, scheme: PasswordScheme) -> Self {
        Self { db, jwt, scheme }
    }

    pub async fn list(&self, query: PageQuery) -> AppResult<Page<BackendUserView>> {
        let page_size = query.page_size();
        let paginator = BackendUser::find()
            .find_also_related(Role)
            .order_by_desc(backend_user::Column::CreatedAt)
            .order_by_desc(backend_user::Column::Id)
            .paginate(&self.db, page_size);

        let total = paginator.num_items().await?;
        let list = paginator
            .fetch_page(query.page() - 1)
            .await?
            .into_iter()
            .map(|(user, role)| BackendUserView::new(user, role))
            .collect();
        Ok(Page::new(list, total, query.page(), page_size))
    }

    pub async fn get(&self, id: i32) -> AppResult<BackendUserView> {
        let (user, role) = BackendUser::find_by_id(id)
            .find_also_related(Role)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;
        Ok(BackendUserView::new(user, role))
    }

    /// Create an enabled account with a generated secret.
    pub async fn create(&self, input: BackendUserInput) -> AppResult<CreatedUser> {
        validate_input(&input)?;
        let role = self.assignable_role(input.role_id).await?;
        self.ensure_unique(&input.username, &input.email, None).await?;

        let password = generate_password();
        let now = now();
        let user = backend_user::ActiveModel {
            username: Set(input.username.trim().to_string()),
            email: Set(input.email.trim().to_string()),
            password: Set(self.scheme.hash(&password)?),
            role_id: Set(role.id),
            status: Set(Status::Enabled.as_i32()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(
            user_id = user.id,
            username = %user.username,
            role_id = role.id,
            "backend user created"
        );
        Ok(CreatedUser {
            user: BackendUserView::new(user, Some(role)),
            password,
        })
    }

    pub async fn update(&self, id: i32, input: BackendUserInput) -> AppResult<BackendUserView> {
        validate_input(&input)?;
        let existing = self.find(id).await?;
        let role = self.assignable_role(input.role_id).await?;
        self.ensure_unique(&input.username, &input.email, Some(id)).await?;

        let mut active: backend_user::ActiveModel = existing.into();
        active.username = Set(input.username.trim().to_string());
        active.email = Set(input.email.trim().to_string());
        active.role_id = Set(role.id);
        active.updated_at = Set(now());

        let user = active.update(&self.db).await?;
        info!(user_id = id, "backend user updated");
        Ok(BackendUserView::new(user, Some(role)))
    }

    pub async fn set_status(&self, id: i32, status: i32) -> AppResult<BackendUserView> {
        let status = Status::parse(status)?;
        let existing = self.find(id).await?;

        let mut active: backend_user::ActiveModel = existing.into();
        active.status = Set(status.as_i32());
        active.updated_at = Set(now());
        active.update(&self.db).await?;

        info!(user_id = id, status = status.as_i32(), "backend user status changed");
        self.get(id).await
    }

    /// Replace the account's secret with a fresh generated one.
    pub async fn reset_password(&self, id: i32) -> AppResult<PasswordReset> {
        let existing = self.find(id).await?;
        let password = generate_password();

        let mut active: backend_user::ActiveModel = existing.into();
        active.password = Set(self.scheme.hash(&password)?);
        active.updated_at = Set(now());
        active.update(&self.db).await?;

        info!(user_id = id, "backend user password reset");
        Ok(PasswordReset { id, password })
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = BackendUser::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("user not found"));
        }
        info!(user_id = id, "backend user deleted");
        Ok(())
    }

    /// Every failure mode collapses into the same `Unauthorized`.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse> {
        let (user, role) = BackendUser::find()
            .filter(backend_user::Column::Username.eq(username.trim()))
            .find_also_related(Role)
            .one(&self.db)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if user.status != Status::Enabled.as_i32() || !verify_password(password, &user.password) {
            warn!(username = %user.username, "login rejected");
            return Err(AppError::Unauthorized);
        }

        let (role_name, role_display) = role
            .map(|r| (r.name, r.display_name))
            .unwrap_or_default();

        let token = self.jwt.generate_token(&TokenSubject {
            user_id: user.id,
            username: &user.username,
            role_id: user.role_id,
            role_name: &role_name,
        })?;

        info!(user_id = user.id, "backend user logged in");
        Ok(LoginResponse {
            token,
            user: LoginUser {
                id: user.id,
                username: user.username,
                email: user.email,
                role_id: user.role_id,
                role: role_name,
                role_display,
            },
        })
    }

    /// Change the caller's own secret after checking the current one.
    pub async fn change_password(
        &self,
        user_id: i32,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        if new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::bad_input(format!(
                "new password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let existing = self.find(user_id).await?;
        if !verify_password(old_password, &existing.password) {
            return Err(AppError::bad_input("current password is incorrect"));
        }

        let mut active: backend_user::ActiveModel = existing.into();
        active.password = Set(self.scheme.hash(new_password)?);
        active.updated_at = Set(now());
        active.update(&self.db).await?;

        info!(user_id, "backend user changed password");
        Ok(())
    }

    /// Create an `admin` account unless one already exists.
    pub async fn ensure_admin(
        &self,
        username: &str,
        email: &str,
    ) -> AppResult<Option<CreatedUser>> {
        let admin = Role::find()
            .filter(role::Column::Name.eq("admin"))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("admin role not found"))?;

        let holders = BackendUser::find()
            .filter(backend_user::Column::RoleId.eq(admin.id))
            .count(&self.db)
            .await?;
        if holders > 0 {
            return Ok(None);
        }

        self.create(BackendUserInput {
            username: username.to_string(),
            email: email.to_string(),
            role_id: admin.id,
        })
        .await
        .map(Some)
    }

    async fn find(&self, id: i32) -> AppResult<backend_user::Model> {
        BackendUser::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))
    }

    async fn assignable_role(&self, role_id: i32) -> AppResult<role::Model> {
        match Role::find_by_id(role_id).one(&self.db).await? {
            Some(role) if role.status == Status::Enabled.as_i32() => Ok(role),
            Some(_) => Err(AppError::conflict("role is disabled")),
            None => Err(AppError::conflict("role does not exist")),
        }
    }

    async fn ensure_unique(
        &self,
        username: &str,
        email: &str,
        except: Option<i32>,
    ) -> AppResult<()> {
        let mut query = BackendUser::find().filter(
            backend_user::Column::Username
                .eq(username.trim())
                .or(backend_user::Column::Email.eq(email.trim())),
        );
        if let Some(id) = except {
            query = query.filter(backend_user::Column::Id.ne(id));
        }

        if query.one(&self.db).await?.is_some() {
            return Err(AppError::conflict("username or email already in use"));
        }
        Ok(())
    }
}

fn validate_input(input: &BackendUserInput) -> AppResult<()> {
    require_non_empty("username", &input.username)?;
    require_non_empty("email", &input.email)?;
    if !input.email.contains('@') {
        return Err(AppError::bad_input("email is not valid"));
    }
    Ok(())
}
