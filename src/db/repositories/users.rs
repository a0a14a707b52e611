use diesel::prelude::*;

use crate::db::models::user::User;

pub struct UsersRepo;

impl UsersRepo {
    pub fn find_by_id(
        conn: &mut PgConnection,
        user_id: uuid::Uuid,
    ) -> Result<Option<User>, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        users
            .filter(id.eq(user_id))
            .select(User::as_select())
            .first::<User>(conn)
            .optional()
    }

    pub fn list_active(conn: &mut PgConnection) -> Result<Vec<User>, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        users
            .filter(is_active.eq(true))
            .select(User::as_select())
            .order(created_at.asc())
            .load::<User>(conn)
    }
}
