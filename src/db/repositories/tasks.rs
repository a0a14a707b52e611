use diesel::prelude::*;

use crate::db::models::task::{NewTask, Task};

pub struct TasksRepo;

impl TasksRepo {
    pub fn insert(conn: &mut PgConnection, new_task: &NewTask) -> Result<Task, diesel::result::Error> {
        diesel::insert_into(crate::schema::tasks::table)
            .values(new_task)
            .returning(Task::as_returning())
            .get_result(conn)
    }
}
