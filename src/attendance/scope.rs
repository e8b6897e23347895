use crate::error::ApiError;
use crate::model::{attendance::AttendanceRecord, role::Role};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use utoipa::IntoParams;
use uuid::Uuid;

/// Explicit identity every read takes; no ambient session state.
#[derive(Debug, Copy, Clone)]
pub struct Caller {
    pub profile_id: Uuid,
    pub role: Role,
}

/// Optional filters a caller may add on top of their role scope.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
pub struct AttendanceFilter {
    /// Restrict to one student
    pub student_id: Option<Uuid>,
    /// Restrict to one class
    pub class_id: Option<Uuid>,
    /// Start of date range (inclusive)
    pub from: Option<NaiveDate>,
    /// End of date range (inclusive)
    pub to: Option<NaiveDate>,
}

/// The set of attendance rows a caller may read, resolved from their role
/// and relationship edges before any explicit filter is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeSet {
    /// Admin: unrestricted
    All,
    /// Student: own rows only
    Own(Uuid),
    /// Parent: rows of linked children
    Students(Vec<Uuid>),
    /// Teacher: rows of classes they teach
    Classes(Vec<Uuid>),
    /// No accessible rows (e.g. parent with no linked children)
    Empty,
}

impl ScopeSet {
    /// Builds the scope from a role and its already-fetched relationship
    /// edges. `links` holds child ids for a parent and class ids for a
    /// teacher; it is ignored for students and admins.
    pub fn for_caller(caller: &Caller, links: Vec<Uuid>) -> ScopeSet {
        match caller.role {
            Role::Student => ScopeSet::Own(caller.profile_id),
            Role::Teacher => {
                if links.is_empty() {
                    ScopeSet::Empty
                } else {
                    ScopeSet::Classes(links)
                }
            }
            Role::Parent => {
                if links.is_empty() {
                    ScopeSet::Empty
                } else {
                    ScopeSet::Students(links)
                }
            }
            Role::Admin => ScopeSet::All,
        }
    }

    /// True when the explicit filter cannot intersect this scope, so the
    /// result is known to be empty without touching the database. Filters
    /// intersect the scope; they never widen it.
    pub fn excludes(&self, filter: &AttendanceFilter) -> bool {
        match self {
            ScopeSet::Empty => true,
            ScopeSet::All => false,
            ScopeSet::Own(own) => filter.student_id.map_or(false, |s| s != *own),
            ScopeSet::Students(students) => {
                filter.student_id.map_or(false, |s| !students.contains(&s))
            }
            ScopeSet::Classes(classes) => filter.class_id.map_or(false, |c| !classes.contains(&c)),
        }
    }
}

enum Bind {
    Id(Uuid),
    Ids(Vec<Uuid>),
    Date(NaiveDate),
}

/// Builds the scoped SELECT with positional binds. Scope clause first, then
/// the explicit filters.
fn build_query(scope: &ScopeSet, filter: &AttendanceFilter) -> (String, Vec<Bind>) {
    let mut sql = String::from(
        "SELECT id, student_id, class_id, date, status, check_in_time, \
         location_verified, marked_by, notes, created_at \
         FROM attendance WHERE 1=1",
    );
    let mut binds: Vec<Bind> = Vec::new();

    match scope {
        ScopeSet::All | ScopeSet::Empty => {}
        ScopeSet::Own(id) => {
            binds.push(Bind::Id(*id));
            sql.push_str(&format!(" AND student_id = ${}", binds.len()));
        }
        ScopeSet::Students(ids) => {
            binds.push(Bind::Ids(ids.clone()));
            sql.push_str(&format!(" AND student_id = ANY(${})", binds.len()));
        }
        ScopeSet::Classes(ids) => {
            binds.push(Bind::Ids(ids.clone()));
            sql.push_str(&format!(" AND class_id = ANY(${})", binds.len()));
        }
    }

    if let Some(student_id) = filter.student_id {
        binds.push(Bind::Id(student_id));
        sql.push_str(&format!(" AND student_id = ${}", binds.len()));
    }
    if let Some(class_id) = filter.class_id {
        binds.push(Bind::Id(class_id));
        sql.push_str(&format!(" AND class_id = ${}", binds.len()));
    }
    if let Some(from) = filter.from {
        binds.push(Bind::Date(from));
        sql.push_str(&format!(" AND date >= ${}", binds.len()));
    }
    if let Some(to) = filter.to {
        binds.push(Bind::Date(to));
        sql.push_str(&format!(" AND date <= ${}", binds.len()));
    }

    sql.push_str(" ORDER BY date DESC");

    (sql, binds)
}

/// Resolves the relationship edges a scope needs: class ids for a teacher,
/// child ids for a parent.
async fn resolve_links(pool: &PgPool, caller: &Caller) -> Result<Vec<Uuid>, ApiError> {
    let links = match caller.role {
        Role::Teacher => {
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM classes WHERE teacher_id = $1")
                .bind(caller.profile_id)
                .fetch_all(pool)
                .await?
        }
        Role::Parent => {
            sqlx::query_scalar::<_, Uuid>(
                "SELECT student_id FROM parent_students WHERE parent_id = $1",
            )
            .bind(caller.profile_id)
            .fetch_all(pool)
            .await?
        }
        Role::Student | Role::Admin => Vec::new(),
    };
    Ok(links)
}

/// Fetches the attendance rows a caller may read, intersected with any
/// explicit filter. Side-effect free and safe to repeat. A caller with no
/// accessible scope gets an empty set, never an error.
pub async fn fetch_scoped(
    pool: &PgPool,
    caller: &Caller,
    filter: &AttendanceFilter,
) -> Result<Vec<AttendanceRecord>, ApiError> {
    let links = resolve_links(pool, caller).await?;
    let scope = ScopeSet::for_caller(caller, links);

    if scope.excludes(filter) {
        return Ok(Vec::new());
    }

    let (sql, binds) = build_query(&scope, filter);

    let mut query = sqlx::query_as::<_, AttendanceRecord>(&sql);
    for bind in binds {
        query = match bind {
            Bind::Id(v) => query.bind(v),
            Bind::Ids(v) => query.bind(v),
            Bind::Date(v) => query.bind(v),
        };
    }

    let records = query.fetch_all(pool).await?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: Role) -> Caller {
        Caller {
            profile_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn student_scope_is_own_rows_only() {
        let c = caller(Role::Student);
        let scope = ScopeSet::for_caller(&c, vec![]);
        assert_eq!(scope, ScopeSet::Own(c.profile_id));

        let (sql, binds) = build_query(&scope, &AttendanceFilter::default());
        assert!(sql.contains("student_id = $1"));
        assert_eq!(binds.len(), 1);
    }

    #[test]
    fn student_asking_for_another_student_gets_nothing() {
        let c = caller(Role::Student);
        let scope = ScopeSet::for_caller(&c, vec![]);
        let filter = AttendanceFilter {
            student_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(scope.excludes(&filter));
    }

    #[test]
    fn student_asking_for_own_rows_is_allowed() {
        let c = caller(Role::Student);
        let scope = ScopeSet::for_caller(&c, vec![]);
        let filter = AttendanceFilter {
            student_id: Some(c.profile_id),
            ..Default::default()
        };
        assert!(!scope.excludes(&filter));
    }

    #[test]
    fn parent_without_children_has_empty_scope() {
        let c = caller(Role::Parent);
        let scope = ScopeSet::for_caller(&c, vec![]);
        assert_eq!(scope, ScopeSet::Empty);
        assert!(scope.excludes(&AttendanceFilter::default()));
    }

    #[test]
    fn parent_filter_must_name_a_linked_child() {
        let child = Uuid::new_v4();
        let c = caller(Role::Parent);
        let scope = ScopeSet::for_caller(&c, vec![child]);

        let own_child = AttendanceFilter {
            student_id: Some(child),
            ..Default::default()
        };
        let stranger = AttendanceFilter {
            student_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(!scope.excludes(&own_child));
        assert!(scope.excludes(&stranger));
    }

    #[test]
    fn teacher_scope_covers_their_classes() {
        let class = Uuid::new_v4();
        let c = caller(Role::Teacher);
        let scope = ScopeSet::for_caller(&c, vec![class]);
        assert_eq!(scope, ScopeSet::Classes(vec![class]));

        let other_class = AttendanceFilter {
            class_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(scope.excludes(&other_class));
    }

    #[test]
    fn admin_scope_is_unrestricted() {
        let c = caller(Role::Admin);
        let scope = ScopeSet::for_caller(&c, vec![]);
        assert_eq!(scope, ScopeSet::All);
        assert!(!scope.excludes(&AttendanceFilter::default()));

        let (sql, binds) = build_query(&scope, &AttendanceFilter::default());
        assert!(!sql.contains("AND"));
        assert!(binds.is_empty());
    }

    #[test]
    fn explicit_filters_intersect_the_scope() {
        let c = caller(Role::Student);
        let scope = ScopeSet::for_caller(&c, vec![]);
        let filter = AttendanceFilter {
            class_id: Some(Uuid::new_v4()),
            from: Some("2026-08-01".parse().unwrap()),
            to: Some("2026-08-29".parse().unwrap()),
            ..Default::default()
        };

        let (sql, binds) = build_query(&scope, &filter);
        // role scope stays in place alongside the explicit filters
        assert!(sql.contains("student_id = $1"));
        assert!(sql.contains("class_id = $2"));
        assert!(sql.contains("date >= $3"));
        assert!(sql.contains("date <= $4"));
        assert_eq!(binds.len(), 4);
    }

    #[test]
    fn class_scope_binds_an_id_array() {
        let scope = ScopeSet::Classes(vec![Uuid::new_v4(), Uuid::new_v4()]);
        let (sql, _) = build_query(&scope, &AttendanceFilter::default());
        assert!(sql.contains("class_id = ANY($1)"));
    }
}
