use diesel::prelude::*;

use crate::db::models::roadmap::Roadmap;

pub struct RoadmapsRepo;

impl RoadmapsRepo {
    pub fn find_owned(
        conn: &mut PgConnection,
        owner_id: uuid::Uuid,
        roadmap_id: uuid::Uuid,
    ) -> Result<Option<Roadmap>, diesel::result::Error> {
        use crate::schema::roadmaps::dsl::*;
        roadmaps
            .filter(id.eq(roadmap_id))
            .filter(user_id.eq(owner_id))
            .select(Roadmap::as_select())
            .first::<Roadmap>(conn)
            .optional()
    }

    pub fn list_by_user(
        conn: &mut PgConnection,
        owner_id: uuid::Uuid,
    ) -> Result<Vec<Roadmap>, diesel::result::Error> {
        use crate::schema::roadmaps::dsl::*;
        roadmaps
            .filter(user_id.eq(owner_id))
            .select(Roadmap::as_select())
            .order(start_date.asc())
            .load::<Roadmap>(conn)
    }

    pub fn update_progress(
        conn: &mut PgConnection,
        roadmap_id: uuid::Uuid,
        progress: f64,
    ) -> Result<Roadmap, diesel::result::Error> {
        use crate::schema::roadmaps::dsl::*;
        diesel::update(roadmaps.filter(id.eq(roadmap_id)))
            .set((
                progress_percentage.eq(progress),
                updated_at.eq(chrono::Utc::now()),
            ))
            .returning(Roadmap::as_returning())
            .get_result(conn)
    }
}
