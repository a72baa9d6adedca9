//! In-process records backend for integration tests.
//!
//! An axum app that answers like the real records API: decimals as strings,
//! denormalized display names on sections and grades, 400 on missing or null
//! fields, 400 on a second grade for the same student and section,
//! all-or-nothing bulk create, cascading deletes. Seeding skips the uniqueness
//! check so tests can set up legacy duplicate grades. Every request that
//! reaches a route is recorded for assertions.

#![allow(dead_code)]

use axum::body::Body;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rollbook::confirm::Confirm;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// =============================================================================
// RECORDED TRAFFIC
// =============================================================================

/// One request as the backend saw it; `path` is relative to `/api`.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Value>,
}

// =============================================================================
// STATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Courses,
    Sections,
    Students,
    Grades,
}

#[derive(Default)]
struct Db {
    courses: Vec<Value>,
    sections: Vec<Value>,
    students: Vec<Value>,
    grades: Vec<Value>,
    enrollments: Vec<(u64, u64)>,
    next_id: u64,
    clock: u64,
    requests: Vec<Recorded>,
    failures: Vec<(String, String, u16)>,
}

/// Shared handle to the fake backend's tables.
#[derive(Clone, Default)]
pub struct Stub(Arc<Mutex<Db>>);

fn unique_error() -> Value {
    json!({"non_field_errors": ["The fields student, class_section must make a unique set."]})
}

fn id_of(row: &Value) -> u64 {
    row["id"].as_u64().unwrap_or_default()
}

fn text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn decimal(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn integer(value: Option<&Value>) -> Option<i64> {
    value.and_then(Value::as_i64)
}

fn key(value: Option<&Value>) -> Option<u64> {
    value.and_then(Value::as_u64)
}

fn contains(haystack: &Value, needle: &str) -> bool {
    haystack
        .as_str()
        .is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

impl Db {
    fn table(&self, kind: Kind) -> &Vec<Value> {
        match kind {
            Kind::Courses => &self.courses,
            Kind::Sections => &self.sections,
            Kind::Students => &self.students,
            Kind::Grades => &self.grades,
        }
    }

    fn table_mut(&mut self, kind: Kind) -> &mut Vec<Value> {
        match kind {
            Kind::Courses => &mut self.courses,
            Kind::Sections => &mut self.sections,
            Kind::Students => &mut self.students,
            Kind::Grades => &mut self.grades,
        }
    }

    fn find(&self, kind: Kind, id: u64) -> Option<&Value> {
        self.table(kind).iter().find(|row| id_of(row) == id)
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn now(&mut self) -> String {
        self.clock += 1;
        format!(
            "2024-03-01T10:{:02}:{:02}.000000Z",
            (self.clock / 60) % 60,
            self.clock % 60
        )
    }

    /// A stored row as the API returns it, display names attached.
    fn render(&self, kind: Kind, row: &Value) -> Value {
        let mut out = row.clone();
        match kind {
            Kind::Sections => {
                let course = key(row.get("course")).and_then(|c| self.find(Kind::Courses, c));
                out["course_name"] = course.map_or(Value::Null, |c| c["course_name"].clone());
            }
            Kind::Grades => {
                let student = key(row.get("student")).and_then(|s| self.find(Kind::Students, s));
                let section =
                    key(row.get("class_section")).and_then(|s| self.find(Kind::Sections, s));
                let course = section
                    .and_then(|s| key(s.get("course")))
                    .and_then(|c| self.find(Kind::Courses, c));
                out["student_name"] = student.map_or(Value::Null, |s| s["name"].clone());
                out["section_name"] = section.map_or(Value::Null, |s| s["section_name"].clone());
                out["course_name"] = course.map_or(Value::Null, |c| c["course_name"].clone());
            }
            Kind::Courses | Kind::Students => {}
        }
        out
    }

    fn render_all<'a>(&self, kind: Kind, rows: impl Iterator<Item = &'a Value>) -> Value {
        Value::Array(rows.map(|row| self.render(kind, row)).collect())
    }

    /// Validate a create/update body into the stored field set.
    fn validate(&self, kind: Kind, body: &Value) -> Result<Map<String, Value>, Value> {
        let mut errors = Map::new();
        let mut fields = Map::new();
        let mut require = |name: &str, value: Option<Value>| match value {
            Some(v) => {
                fields.insert(name.to_string(), v);
            }
            None => {
                errors.insert(name.to_string(), json!(["This field may not be null."]));
            }
        };

        match kind {
            Kind::Courses => {
                require("course_id", text(body.get("course_id")).map(Value::from));
                require("course_name", text(body.get("course_name")).map(Value::from));
                require(
                    "credits",
                    decimal(body.get("credits")).map(|c| Value::from(format!("{c:.1}"))),
                );
                require("hours", integer(body.get("hours")).map(Value::from));
            }
            Kind::Sections => {
                for name in ["section_id", "section_name", "semester", "location"] {
                    require(name, text(body.get(name)).map(Value::from));
                }
                require(
                    "course",
                    key(body.get("course"))
                        .filter(|c| self.find(Kind::Courses, *c).is_some())
                        .map(Value::from),
                );
            }
            Kind::Students => {
                require("student_id", text(body.get("student_id")).map(Value::from));
                require("name", text(body.get("name")).map(Value::from));
            }
            Kind::Grades => {
                require(
                    "student",
                    key(body.get("student"))
                        .filter(|s| self.find(Kind::Students, *s).is_some())
                        .map(Value::from),
                );
                require(
                    "class_section",
                    key(body.get("class_section"))
                        .filter(|s| self.find(Kind::Sections, *s).is_some())
                        .map(Value::from),
                );
                require(
                    "score",
                    decimal(body.get("score")).map(|s| Value::from(format!("{s:.2}"))),
                );
            }
        }

        if errors.is_empty() {
            Ok(fields)
        } else {
            Err(Value::Object(errors))
        }
    }

    /// The grade table already holds this (student, section) pair.
    fn grade_taken(&self, fields: &Map<String, Value>, except: Option<u64>) -> bool {
        let pair = (key(fields.get("student")), key(fields.get("class_section")));
        self.grades.iter().any(|g| {
            Some(id_of(g)) != except
                && (key(g.get("student")), key(g.get("class_section"))) == pair
        })
    }

    /// Full validation of an API write, uniqueness included.
    fn check(
        &self,
        kind: Kind,
        body: &Value,
        except: Option<u64>,
    ) -> Result<Map<String, Value>, Value> {
        let fields = self.validate(kind, body)?;
        if kind == Kind::Grades && self.grade_taken(&fields, except) {
            return Err(unique_error());
        }
        Ok(fields)
    }

    fn insert(&mut self, kind: Kind, mut fields: Map<String, Value>) -> Value {
        let id = self.allocate_id();
        fields.insert("id".into(), Value::from(id));
        if kind == Kind::Grades {
            let now = self.now();
            fields.insert("created_at".into(), Value::from(now.clone()));
            fields.insert("updated_at".into(), Value::from(now));
        }
        let row = Value::Object(fields);
        self.table_mut(kind).push(row.clone());
        self.render(kind, &row)
    }

    fn replace(&mut self, kind: Kind, id: u64, fields: Map<String, Value>) -> Option<Value> {
        let now = (kind == Kind::Grades).then(|| self.now());
        let row = self.table_mut(kind).iter_mut().find(|row| id_of(row) == id)?;
        for (name, value) in fields {
            row[name.as_str()] = value;
        }
        if let Some(now) = now {
            row["updated_at"] = Value::from(now);
        }
        let row = row.clone();
        Some(self.render(kind, &row))
    }

    fn remove(&mut self, kind: Kind, id: u64) -> bool {
        let before = self.table(kind).len();
        self.table_mut(kind).retain(|row| id_of(row) != id);
        if self.table(kind).len() == before {
            return false;
        }
        let refers = |row: &Value, field: &str| key(row.get(field)) == Some(id);
        match kind {
            Kind::Courses => {
                let gone: Vec<u64> = self
                    .sections
                    .iter()
                    .filter(|s| refers(*s, "course"))
                    .map(id_of)
                    .collect();
                for section in gone {
                    self.remove(Kind::Sections, section);
                }
            }
            Kind::Sections => {
                self.grades.retain(|g| !refers(g, "class_section"));
                self.enrollments.retain(|(_, s)| *s != id);
            }
            Kind::Students => {
                self.grades.retain(|g| !refers(g, "student"));
                self.enrollments.retain(|(s, _)| *s != id);
            }
            Kind::Grades => {}
        }
        true
    }
}

// =============================================================================
// SEEDING & INSPECTION
// =============================================================================

impl Stub {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut Db) -> T) -> T {
        let mut db = self.0.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut db)
    }

    fn seed(&self, kind: Kind, body: Value) -> u64 {
        self.with(|db| {
            let fields = db.validate(kind, &body).unwrap();
            id_of(&db.insert(kind, fields))
        })
    }

    pub fn seed_course(&self, code: &str, name: &str, credits: &str, hours: i64) -> u64 {
        self.seed(
            Kind::Courses,
            json!({"course_id": code, "course_name": name, "credits": credits, "hours": hours}),
        )
    }

    pub fn seed_section(
        &self,
        code: &str,
        name: &str,
        semester: &str,
        location: &str,
        course: u64,
    ) -> u64 {
        self.seed(
            Kind::Sections,
            json!({
                "section_id": code,
                "section_name": name,
                "semester": semester,
                "location": location,
                "course": course
            }),
        )
    }

    pub fn seed_student(&self, code: &str, name: &str) -> u64 {
        self.seed(Kind::Students, json!({"student_id": code, "name": name}))
    }

    pub fn seed_grade(&self, student: u64, section: u64, score: &str) -> u64 {
        self.seed(
            Kind::Grades,
            json!({"student": student, "class_section": section, "score": score}),
        )
    }

    /// Stored rows of one table, as the API would return them.
    pub fn rows(&self, kind: Kind) -> Vec<Value> {
        self.with(|db| match db.render_all(kind, db.table(kind).iter()) {
            Value::Array(rows) => rows,
            _ => Vec::new(),
        })
    }

    pub fn count(&self, kind: Kind) -> usize {
        self.with(|db| db.table(kind).len())
    }

    pub fn enrollments(&self) -> Vec<(u64, u64)> {
        self.with(|db| db.enrollments.clone())
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.with(|db| db.requests.clone())
    }

    /// Recorded requests matching `method` and `path`.
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// Recorded requests other than GETs.
    pub fn writes(&self) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method != "GET")
            .collect()
    }

    pub fn clear_requests(&self) {
        self.with(|db| db.requests.clear());
    }

    /// Answer `method path` with `status` until [`Stub::heal`].
    pub fn fail(&self, method: &str, path: &str, status: u16) {
        self.with(|db| {
            db.failures
                .push((method.to_string(), path.to_string(), status));
        });
    }

    pub fn heal(&self) {
        self.with(|db| db.failures.clear());
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

fn respond(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn not_found() -> Response {
    respond(StatusCode::NOT_FOUND, json!({"detail": "Not found."}))
}

fn list(stub: &Stub, kind: Kind, query: &HashMap<String, String>) -> Response {
    stub.with(|db| {
        let keep = |row: &&Value| -> bool {
            query.iter().all(|(name, needle)| match (kind, name.as_str()) {
                (Kind::Courses, "course_id" | "course_name") => contains(&row[name.as_str()], needle),
                (Kind::Sections, "semester") => contains(&row["semester"], needle),
                (Kind::Sections, "course") => key(row.get("course"))
                    .and_then(|c| db.find(Kind::Courses, c))
                    .is_some_and(|c| {
                        contains(&c["course_id"], needle) || contains(&c["course_name"], needle)
                    }),
                _ => true,
            })
        };
        respond(
            StatusCode::OK,
            db.render_all(kind, db.table(kind).iter().filter(keep)),
        )
    })
}

fn retrieve(stub: &Stub, kind: Kind, id: u64) -> Response {
    stub.with(|db| match db.find(kind, id) {
        Some(row) => respond(StatusCode::OK, db.render(kind, row)),
        None => not_found(),
    })
}

fn create(stub: &Stub, kind: Kind, body: &Value) -> Response {
    stub.with(|db| match db.check(kind, body, None) {
        Ok(fields) => respond(StatusCode::CREATED, db.insert(kind, fields)),
        Err(errors) => respond(StatusCode::BAD_REQUEST, errors),
    })
}

fn update(stub: &Stub, kind: Kind, id: u64, body: &Value) -> Response {
    stub.with(|db| {
        if db.find(kind, id).is_none() {
            return not_found();
        }
        match db.check(kind, body, Some(id)) {
            Ok(fields) => match db.replace(kind, id, fields) {
                Some(row) => respond(StatusCode::OK, row),
                None => not_found(),
            },
            Err(errors) => respond(StatusCode::BAD_REQUEST, errors),
        }
    })
}

fn destroy(stub: &Stub, kind: Kind, id: u64) -> Response {
    stub.with(|db| {
        if db.remove(kind, id) {
            StatusCode::NO_CONTENT.into_response()
        } else {
            not_found()
        }
    })
}

fn resource(router: Router<Stub>, kind: Kind, path: &str) -> Router<Stub> {
    router
        .route(
            &format!("/api/{path}/"),
            get(
                move |State(stub): State<Stub>, Query(q): Query<HashMap<String, String>>| async move {
                    list(&stub, kind, &q)
                },
            )
            .post(move |State(stub): State<Stub>, Json(body): Json<Value>| async move {
                create(&stub, kind, &body)
            }),
        )
        .route(
            &format!("/api/{path}/{{id}}/"),
            get(move |State(stub): State<Stub>, Path(id): Path<u64>| async move {
                retrieve(&stub, kind, id)
            })
            .put(
                move |State(stub): State<Stub>, Path(id): Path<u64>, Json(body): Json<Value>| async move {
                    update(&stub, kind, id, &body)
                },
            )
            .delete(move |State(stub): State<Stub>, Path(id): Path<u64>| async move {
                destroy(&stub, kind, id)
            }),
        )
}

async fn enroll(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    stub.with(|db| {
        let student = key(body.get("student")).filter(|s| db.find(Kind::Students, *s).is_some());
        let section =
            key(body.get("class_section")).filter(|s| db.find(Kind::Sections, *s).is_some());
        match (student, section) {
            (Some(student), Some(section)) => {
                if !db.enrollments.contains(&(student, section)) {
                    db.enrollments.push((student, section));
                }
                respond(
                    StatusCode::OK,
                    json!({"message": "Student enrolled successfully"}),
                )
            }
            _ => respond(
                StatusCode::NOT_FOUND,
                json!({"error": "Student or Class Section not found"}),
            ),
        }
    })
}

async fn student_grades(State(stub): State<Stub>, Path(id): Path<u64>) -> Response {
    stub.with(|db| {
        let Some(student) = db.find(Kind::Students, id) else {
            return not_found();
        };
        let grades = db.render_all(
            Kind::Grades,
            db.grades
                .iter()
                .filter(|g| key(g.get("student")) == Some(id)),
        );
        let mut report = student.clone();
        report["grades"] = grades;
        respond(StatusCode::OK, report)
    })
}

async fn section_grades(
    State(stub): State<Stub>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let Some(section) = q.get("section").filter(|s| !s.is_empty()) else {
        return respond(
            StatusCode::BAD_REQUEST,
            json!({"error": "Section ID is required"}),
        );
    };
    let section = section.parse::<u64>().ok();
    stub.with(|db| {
        respond(
            StatusCode::OK,
            db.render_all(
                Kind::Grades,
                db.grades
                    .iter()
                    .filter(|g| section.is_some() && key(g.get("class_section")) == section),
            ),
        )
    })
}

async fn bulk_create(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    let Some(items) = body.as_array() else {
        return respond(
            StatusCode::BAD_REQUEST,
            json!({"non_field_errors": ["Expected a list of items."]}),
        );
    };
    stub.with(|db| {
        let mut checked: Vec<Result<Map<String, Value>, Value>> = items
            .iter()
            .map(|item| db.check(Kind::Grades, item, None))
            .collect();
        // Pairs repeated inside the batch collide with each other too.
        for i in 0..checked.len() {
            let repeated = match &checked[i] {
                Ok(fields) => checked[..i].iter().flatten().any(|earlier| {
                    earlier.get("student") == fields.get("student")
                        && earlier.get("class_section") == fields.get("class_section")
                }),
                Err(_) => false,
            };
            if repeated {
                checked[i] = Err(unique_error());
            }
        }
        if checked.iter().any(Result::is_err) {
            let errors: Vec<Value> = checked
                .into_iter()
                .map(|c| c.err().unwrap_or_else(|| json!({})))
                .collect();
            return respond(StatusCode::BAD_REQUEST, Value::Array(errors));
        }
        let saved: Vec<Value> = checked
            .into_iter()
            .flatten()
            .map(|fields| db.insert(Kind::Grades, fields))
            .collect();
        respond(StatusCode::CREATED, Value::Array(saved))
    })
}

/// Record the request, then either inject a failure or pass it on.
async fn record(State(stub): State<Stub>, req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    let method = parts.method.to_string();
    let path = parts
        .uri
        .path()
        .strip_prefix("/api")
        .unwrap_or(parts.uri.path())
        .to_string();

    let injected = stub.with(|db| {
        db.requests.push(Recorded {
            method: method.clone(),
            path: path.clone(),
            query: parts.uri.query().map(str::to_string),
            body: serde_json::from_slice(&bytes).ok(),
        });
        db.failures
            .iter()
            .find(|(m, p, _)| *m == method && *p == path)
            .map(|(_, _, status)| *status)
    });

    if let Some(status) = injected {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return respond(status, json!({"detail": "injected failure"}));
    }
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

pub fn router(stub: Stub) -> Router {
    let mut router = Router::new()
        .route("/api/students/enroll/", post(enroll))
        .route("/api/students/{id}/grades/", get(student_grades))
        .route("/api/grades/section_grades/", get(section_grades))
        .route("/api/grades/bulk_create/", post(bulk_create));
    for (kind, path) in [
        (Kind::Courses, "courses"),
        (Kind::Sections, "sections"),
        (Kind::Students, "students"),
        (Kind::Grades, "grades"),
    ] {
        router = resource(router, kind, path);
    }
    router
        .layer(middleware::from_fn_with_state(stub.clone(), record))
        .with_state(stub)
}

/// Serve the stub on an ephemeral port; returns the API base URL.
pub async fn spawn(stub: &Stub) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(stub.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

// =============================================================================
// PROMPTS
// =============================================================================

/// Answers prompts from a script and remembers what was asked.
pub struct ScriptedConfirm {
    answers: Vec<bool>,
    pub asked: Vec<String>,
}

impl ScriptedConfirm {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().rev().copied().collect(),
            asked: Vec::new(),
        }
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.asked.push(prompt.to_string());
        self.answers.pop().unwrap_or(false)
    }
}
