//! # Records API Client
//!
//! Typed wrapper around the records backend's REST API.
//!
//! One `RollbookClient` (one `reqwest::Client`, one connection pool) is shared
//! by every page. Each resource group is reached through an [`Endpoint`]:
//!
//! ```text
//! client.courses().list()              GET    /courses/
//! client.sections().create(&payload)   POST   /sections/
//! client.students().update(id, &p)     PUT    /students/{id}/
//! client.grades().delete(id)           DELETE /grades/{id}/
//! client.students().enroll(s, c)       POST   /students/enroll/
//! client.grades().section_grades(c)    GET    /grades/section_grades/?section={id}
//! client.grades().bulk_create(&batch)  POST   /grades/bulk_create/
//! ```
//!
//! No retries, no timeouts beyond reqwest's defaults, no authentication.

use reqwest::{Method, RequestBuilder, Response};
use rollbook_core::{
    ClassSection, Course, CourseForm, EnrollRequest, Grade, GradeForm, GradePayload, Record,
    RecordForm, SectionForm, SectionId, Student, StudentForm, StudentGradeReport, StudentId,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use thiserror::Error;

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

// =============================================================================
// ERRORS
// =============================================================================

/// Errors from the HTTP client layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend could not be reached.
    #[error("Cannot connect to records backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// The backend answered with a non-success status.
    #[error("{method} {path} failed ({status}): {body}")]
    Status {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ClientError {
    /// HTTP status, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// =============================================================================
// RESOURCES
// =============================================================================

/// A backend resource group: its collection path, record and form types.
pub trait Resource {
    type Record: Record + DeserializeOwned;
    type Form: RecordForm<Record = Self::Record>;

    /// Collection path segment, e.g. `courses` for `/courses/`.
    const PATH: &'static str;
}

/// Primary key type of a resource's records.
pub type RecordId<R> = <<R as Resource>::Record as Record>::Id;

/// Request body type of a resource's create/update calls.
pub type PayloadOf<R> = <<R as Resource>::Form as RecordForm>::Payload;

pub struct Courses;
pub struct Sections;
pub struct Students;
pub struct Grades;

impl Resource for Courses {
    type Record = Course;
    type Form = CourseForm;
    const PATH: &'static str = "courses";
}

impl Resource for Sections {
    type Record = ClassSection;
    type Form = SectionForm;
    const PATH: &'static str = "sections";
}

impl Resource for Students {
    type Record = Student;
    type Form = StudentForm;
    const PATH: &'static str = "students";
}

impl Resource for Grades {
    type Record = Grade;
    type Form = GradeForm;
    const PATH: &'static str = "grades";
}

/// Acknowledgement body returned by action endpoints such as enroll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client for the records backend.
#[derive(Clone)]
pub struct RollbookClient {
    http: reqwest::Client,
    base_url: String,
}

impl RollbookClient {
    /// Create a client for the API rooted at `base_url` (e.g. `http://host:8000/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Typed endpoint group for any resource.
    pub fn endpoint<R: Resource>(&self) -> Endpoint<'_, R> {
        Endpoint {
            client: self,
            resource: PhantomData,
        }
    }

    pub fn courses(&self) -> Endpoint<'_, Courses> {
        self.endpoint()
    }

    pub fn sections(&self) -> Endpoint<'_, Sections> {
        self.endpoint()
    }

    pub fn students(&self) -> Endpoint<'_, Students> {
        self.endpoint()
    }

    pub fn grades(&self) -> Endpoint<'_, Grades> {
        self.endpoint()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);
        self.http.request(method, &url)
    }

    /// Send a request and map transport failures.
    async fn send(&self, req: RequestBuilder) -> Result<Response, ClientError> {
        req.send()
            .await
            .map_err(|e| ClientError::ConnectionFailed {
                url: self.base_url.clone(),
                reason: e.to_string(),
            })
    }

    /// Turn a non-success status into `ClientError::Status`, keeping the body.
    async fn check_status(
        method: &Method,
        path: &str,
        resp: Response,
    ) -> Result<Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ClientError::Status {
            method: method.to_string(),
            path: path.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn read_json<T: DeserializeOwned>(
        method: &Method,
        path: &str,
        resp: Response,
    ) -> Result<T, ClientError> {
        let resp = Self::check_status(method, path, resp).await?;
        resp.json::<T>()
            .await
            .map_err(|e| ClientError::ParseError(format!("{method} {path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let mut req = self.request(Method::GET, path);
        if !query.is_empty() {
            req = req.query(query);
        }
        let resp = self.send(req).await?;
        Self::read_json(&Method::GET, path, resp).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.request(method.clone(), path).json(body);
        let resp = self.send(req).await?;
        Self::read_json(&method, path, resp).await
    }

    async fn delete_path(&self, path: &str) -> Result<(), ClientError> {
        let req = self.request(Method::DELETE, path);
        let resp = self.send(req).await?;
        Self::check_status(&Method::DELETE, path, resp).await?;
        Ok(())
    }
}

// =============================================================================
// ENDPOINTS
// =============================================================================

/// CRUD calls for one resource group.
pub struct Endpoint<'a, R> {
    client: &'a RollbookClient,
    resource: PhantomData<R>,
}

impl<R: Resource> Endpoint<'_, R> {
    fn collection_path() -> String {
        format!("/{}/", R::PATH)
    }

    fn item_path(id: RecordId<R>) -> String {
        format!("/{}/{}/", R::PATH, id)
    }

    /// GET the whole collection.
    pub async fn list(&self) -> Result<Vec<R::Record>, ClientError> {
        self.list_filtered(&[]).await
    }

    /// GET the collection with query-parameter filters.
    pub async fn list_filtered(
        &self,
        filters: &[(&str, String)],
    ) -> Result<Vec<R::Record>, ClientError> {
        self.client
            .get_json(&Self::collection_path(), filters)
            .await
    }

    /// GET one record.
    pub async fn get(&self, id: RecordId<R>) -> Result<R::Record, ClientError> {
        self.client.get_json(&Self::item_path(id), &[]).await
    }

    /// POST a new record.
    pub async fn create(&self, payload: &PayloadOf<R>) -> Result<R::Record, ClientError> {
        self.client
            .send_json(Method::POST, &Self::collection_path(), payload)
            .await
    }

    /// PUT a full replacement of an existing record.
    pub async fn update(
        &self,
        id: RecordId<R>,
        payload: &PayloadOf<R>,
    ) -> Result<R::Record, ClientError> {
        self.client
            .send_json(Method::PUT, &Self::item_path(id), payload)
            .await
    }

    /// DELETE a record.
    pub async fn delete(&self, id: RecordId<R>) -> Result<(), ClientError> {
        self.client.delete_path(&Self::item_path(id)).await
    }
}

impl Endpoint<'_, Students> {
    /// POST /students/enroll/: add a student to a class section.
    pub async fn enroll(
        &self,
        student: StudentId,
        class_section: SectionId,
    ) -> Result<Ack, ClientError> {
        let body = EnrollRequest {
            student,
            class_section,
        };
        self.client
            .send_json(Method::POST, "/students/enroll/", &body)
            .await
    }

    /// GET /students/{id}/grades/: the student with every grade they hold.
    pub async fn grade_report(&self, id: StudentId) -> Result<StudentGradeReport, ClientError> {
        self.client
            .get_json(&format!("/students/{id}/grades/"), &[])
            .await
    }
}

impl Endpoint<'_, Grades> {
    /// GET /grades/section_grades/?section={id}: grades of one class section.
    pub async fn section_grades(&self, section: SectionId) -> Result<Vec<Grade>, ClientError> {
        self.client
            .get_json(
                "/grades/section_grades/",
                &[("section", section.to_string())],
            )
            .await
    }

    /// POST /grades/bulk_create/: one batch write of many grades.
    pub async fn bulk_create(&self, batch: &[GradePayload]) -> Result<Vec<Grade>, ClientError> {
        self.client
            .send_json(Method::POST, "/grades/bulk_create/", batch)
            .await
    }
}
