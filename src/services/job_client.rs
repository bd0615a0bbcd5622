//! Job board client: cached, coalesced, retrying access to the JobStir API
//! with a local fallback store.

use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;
use validator::Validate;

use crate::cache::{CacheManager, CacheStats, SingleFlight};
use crate::config::settings::{CacheConfig, Settings};
use crate::error::{AppError, AppResult};
use crate::external::{
    ApiRequest, FetchError, ReqwestTransport, ResilientFetcher, RetryPolicy, Transport,
    build_http_client,
};
use crate::models::{
    ApplicationData, ApplicationList, ApplicationRecord, ApplicationResult, ApplicationStatus,
    DataSource, EvaluationRequest, EvaluationResult, FilterSet, HealthReport, HealthStatus,
    JobDraft, JobListing, JobRecord,
};
use crate::sanitize::{
    extract_item, extract_list, extract_total, sanitize_application, sanitize_evaluation,
    sanitize_job,
};
use crate::store::{APPLICATIONS_COLLECTION, FallbackStore, JOBS_COLLECTION, placeholder_jobs};

const JOBS_PATH: &str = "/api/jobs";
const APPLICATIONS_PATH: &str = "/api/applications";
const EVALUATE_PATH: &str = "/api/evaluate-resume";
const HEALTH_PATH: &str = "/api/health";

type FetchOutcome = Result<Value, FetchError>;

/// How the client answers requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientMode {
    /// Remote API first, fallback store on failure
    Live,
    /// No API configured; everything is served from the fallback store
    Fallback,
}

impl ClientMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientMode::Live => "live",
            ClientMode::Fallback => "fallback",
        }
    }
}

fn job_key(job_id: &str) -> String {
    format!("{JOBS_PATH}/{job_id}")
}

fn jobs_key(filters: &FilterSet) -> String {
    format!("{JOBS_PATH}{}", filters.cache_fragment())
}

fn applications_key(user_id: &str) -> String {
    format!("{APPLICATIONS_PATH}?user_id={user_id}")
}

/// Trimmed, non-empty identifier or a validation error naming `field`.
fn required<'a>(field: &str, value: &'a str) -> AppResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(field, format!("{field} is required")));
    }
    Ok(value)
}

/// Like [`required`], but also rejects `.` and `..`, which cannot travel as a
/// single path segment.
fn job_id_arg<'a>(field: &str, value: &'a str) -> AppResult<&'a str> {
    let value = required(field, value)?;
    if value == "." || value == ".." {
        return Err(AppError::validation(field, format!("{field} is not a valid id")));
    }
    Ok(value)
}

/// 404 becomes `NotFound`; anything else is passed through.
fn not_found_or(err: FetchError, entity: &str, id: &str) -> AppError {
    match err {
        FetchError::Http { status: 404, .. } => AppError::not_found(entity, "id", id),
        other => AppError::Fetch(other),
    }
}

/// Sanitize every job in a listing, dropping the ones without an id.
fn sanitize_jobs(items: &[Value]) -> Vec<JobRecord> {
    items
        .iter()
        .map(|raw| sanitize_job(Some(raw)))
        .filter(|job| !job.id.is_empty())
        .collect()
}

fn live_listing(value: &Value) -> JobListing {
    let jobs = sanitize_jobs(extract_list(value, &["jobs"]));
    JobListing {
        total: extract_total(value).unwrap_or(jobs.len() as u64),
        jobs,
        source: DataSource::Live,
        cached: false,
        error: None,
    }
}

/// The job in a detail response, if it is the one that was asked for.
fn live_job(value: &Value, job_id: &str) -> Option<JobRecord> {
    let job = sanitize_job(extract_item(value, "job"));
    (job.id == job_id).then_some(job)
}

fn live_applications(value: &Value) -> ApplicationList {
    let applications: Vec<_> = extract_list(value, &["applications"])
        .iter()
        .map(|raw| sanitize_application(Some(raw)))
        .collect();
    ApplicationList {
        total: extract_total(value).unwrap_or(applications.len() as u64),
        applications,
        source: DataSource::Live,
        cached: false,
        error: None,
    }
}

/// Client for the JobStir job board.
///
/// Reads go through the response cache and are coalesced per cache key, so
/// concurrent identical misses share one request. Failing reads degrade to
/// the fallback store and say so in their result; writes and evaluations
/// report failures to the caller.
///
/// Cloning is cheap; clones share the cache, in-flight map and store.
#[derive(Clone)]
pub struct JobClient {
    fetcher: Option<ResilientFetcher>,
    cache: CacheManager,
    flights: SingleFlight<FetchOutcome>,
    store: FallbackStore,
    /// Serializes read-modify-write cycles on the fallback store
    store_writes: Arc<Mutex<()>>,
}

impl JobClient {
    /// Build a client from loaded settings.
    ///
    /// With an empty `api.base_url` the client runs in fallback mode. When
    /// `fallback.seed_placeholders` is set, an empty job collection is seeded
    /// with the built-in placeholder jobs.
    pub async fn new(settings: &Settings) -> AppResult<Self> {
        let transport: Option<Arc<dyn Transport>> = if settings.api.is_configured() {
            let http = build_http_client(&settings.api).map_err(|e| AppError::Configuration {
                key: "api".to_string(),
                source: anyhow::Error::new(e),
            })?;
            let transport = ReqwestTransport::new(http, settings.api.base_url.trim()).map_err(
                |e| AppError::Configuration {
                    key: "api.base_url".to_string(),
                    source: anyhow::Error::new(e),
                },
            )?;
            Some(Arc::new(transport))
        } else {
            tracing::warn!("No API base URL configured, serving from the fallback store");
            None
        };

        let store = FallbackStore::from_config(&settings.fallback)
            .map_err(|e| AppError::store("open fallback store", e))?;

        let client = Self::with_parts(
            transport,
            CacheManager::new(settings.cache.clone()),
            store,
            RetryPolicy::from_config(&settings.api),
        );

        if settings.fallback.seed_placeholders {
            client.seed_placeholders().await?;
        }

        tracing::info!(mode = client.mode().as_str(), "Job client ready");
        Ok(client)
    }

    /// Assemble a client from explicit parts. `None` selects fallback mode.
    pub fn with_parts(
        transport: Option<Arc<dyn Transport>>,
        cache: CacheManager,
        store: FallbackStore,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            fetcher: transport.map(|t| ResilientFetcher::new(t, policy)),
            cache,
            flights: SingleFlight::new(),
            store,
            store_writes: Arc::new(Mutex::new(())),
        }
    }

    pub fn mode(&self) -> ClientMode {
        if self.fetcher.is_some() {
            ClientMode::Live
        } else {
            ClientMode::Fallback
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn store(&self) -> &FallbackStore {
        &self.store
    }

    fn ttls(&self) -> &CacheConfig {
        self.cache.config()
    }

    /// Drop every cached response and forget in-flight requests.
    ///
    /// Callers already awaiting a request still receive its result.
    pub async fn shutdown(&self) {
        let removed = self.cache.clear(None).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to clear cache on shutdown");
            0
        });
        self.flights.clear();
        tracing::info!(removed, "Job client shut down");
    }

    // ========================================================================
    // Jobs
    // ========================================================================

    /// List jobs matching `filters`.
    ///
    /// Never fails. When the API cannot answer, stored jobs (or the built-in
    /// placeholders) are returned with `source = Fallback` and the error.
    /// Degraded listings are not cached.
    pub async fn list_jobs(&self, filters: &FilterSet) -> JobListing {
        let Some(fetcher) = &self.fetcher else {
            let jobs = self.fallback_jobs(filters).await;
            return JobListing {
                total: jobs.len() as u64,
                jobs,
                source: DataSource::Fallback,
                cached: false,
                error: None,
            };
        };

        let key = jobs_key(filters);
        if let Some(listing) = self.cache_get::<JobListing>(&key).await {
            return JobListing {
                cached: true,
                ..listing
            };
        }

        let request = ApiRequest::get(JOBS_PATH).with_query_pairs(filters.iter());
        let outcome = self
            .fetch_shared(fetcher, &key, request, self.ttls().jobs_ttl(), |value| {
                let listing = live_listing(value);
                let dropped = extract_list(value, &["jobs"]).len() - listing.jobs.len();
                if dropped > 0 {
                    tracing::warn!(dropped, "Dropped jobs without an id");
                }
                Some(listing)
            })
            .await;

        match outcome {
            Ok(value) => live_listing(&value),
            Err(err) => {
                tracing::warn!(error = %err, "Job listing unavailable, serving fallback jobs");
                let jobs = self.fallback_jobs(filters).await;
                JobListing {
                    total: jobs.len() as u64,
                    jobs,
                    source: DataSource::Fallback,
                    cached: false,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    /// Fetch one job.
    ///
    /// Empty, `.` and `..` ids are rejected before any I/O. A response for a
    /// different id is `NotFound`. If the API is unreachable the fallback
    /// store is consulted before giving up.
    pub async fn get_job_details(&self, job_id: &str) -> AppResult<JobRecord> {
        let job_id = job_id_arg("job_id", job_id)?;

        let Some(fetcher) = &self.fetcher else {
            return self
                .find_fallback_job(job_id)
                .await
                .ok_or_else(|| AppError::not_found("job", "id", job_id));
        };

        let key = job_key(job_id);
        if let Some(job) = self.cache_get::<JobRecord>(&key).await {
            return Ok(job);
        }

        let request = ApiRequest::get(JOBS_PATH).with_segment(job_id);
        let requested = job_id.to_string();
        let outcome = self
            .fetch_shared(fetcher, &key, request, self.ttls().job_detail_ttl(), move |value| {
                live_job(value, &requested)
            })
            .await;

        match outcome {
            Ok(value) => live_job(&value, job_id).ok_or_else(|| {
                tracing::warn!(job_id, "API response does not describe the requested job");
                AppError::not_found("job", "id", job_id)
            }),
            Err(err @ FetchError::Network { .. }) => {
                match self.find_fallback_job(job_id).await {
                    Some(job) => {
                        tracing::warn!(job_id, error = %err, "Serving job from fallback store");
                        Ok(job)
                    }
                    None => Err(AppError::Fetch(err)),
                }
            }
            Err(err) => Err(not_found_or(err, "job", job_id)),
        }
    }

    /// Publish a new job posting.
    pub async fn create_job(&self, draft: &JobDraft) -> AppResult<JobRecord> {
        Self::validate_draft(draft)?;

        let Some(fetcher) = &self.fetcher else {
            let _guard = self.store_writes.lock().await;
            let mut jobs = self.read_fallback_jobs().await?;
            let job = draft
                .clone()
                .into_record(Uuid::new_v4().to_string(), Timestamp::now());
            jobs.push(job.clone());
            self.write_fallback(JOBS_COLLECTION, &jobs).await?;
            tracing::info!(job_id = %job.id, "Job created in fallback store");
            return Ok(job);
        };

        let body = serde_json::to_value(draft).map_err(anyhow::Error::from)?;
        // Not idempotent: a retried POST could publish the job twice.
        let value = fetcher
            .request_with_retries(&ApiRequest::post(JOBS_PATH, body), 0)
            .await?;

        let job = sanitize_job(extract_item(&value, "job"));
        if job.id.is_empty() {
            return Err(AppError::Fetch(FetchError::Decode {
                message: "created job has no id".to_string(),
            }));
        }

        self.invalidate(JOBS_PATH).await;
        tracing::info!(job_id = %job.id, "Job created");
        Ok(job)
    }

    /// Replace the writable fields of a job posting.
    pub async fn update_job(&self, job_id: &str, draft: &JobDraft) -> AppResult<JobRecord> {
        let job_id = job_id_arg("job_id", job_id)?;
        Self::validate_draft(draft)?;

        let Some(fetcher) = &self.fetcher else {
            let _guard = self.store_writes.lock().await;
            let mut jobs = self.read_fallback_jobs().await?;
            let job = jobs
                .iter_mut()
                .find(|job| job.id == job_id)
                .ok_or_else(|| AppError::not_found("job", "id", job_id))?;
            draft.apply_to(job);
            let updated = job.clone();
            self.write_fallback(JOBS_COLLECTION, &jobs).await?;
            return Ok(updated);
        };

        let body = serde_json::to_value(draft).map_err(anyhow::Error::from)?;
        let value = fetcher
            .request(&ApiRequest::put(JOBS_PATH, body).with_segment(job_id))
            .await
            .map_err(|e| not_found_or(e, "job", job_id))?;

        let mut job = sanitize_job(extract_item(&value, "job"));
        if job.id.is_empty() {
            job.id = job_id.to_string();
        }

        self.invalidate(JOBS_PATH).await;
        tracing::info!(job_id, "Job updated");
        Ok(job)
    }

    /// Remove a job posting. Applications referencing it are left alone.
    pub async fn delete_job(&self, job_id: &str) -> AppResult<()> {
        let job_id = job_id_arg("job_id", job_id)?;

        let Some(fetcher) = &self.fetcher else {
            let _guard = self.store_writes.lock().await;
            let mut jobs = self.read_fallback_jobs().await?;
            let before = jobs.len();
            jobs.retain(|job| job.id != job_id);
            if jobs.len() == before {
                return Err(AppError::not_found("job", "id", job_id));
            }
            return self.write_fallback(JOBS_COLLECTION, &jobs).await;
        };

        fetcher
            .request(&ApiRequest::delete(JOBS_PATH).with_segment(job_id))
            .await
            .map_err(|e| not_found_or(e, "job", job_id))?;

        self.invalidate(JOBS_PATH).await;
        tracing::info!(job_id, "Job deleted");
        Ok(())
    }

    fn validate_draft(draft: &JobDraft) -> AppResult<()> {
        draft.validate()?;
        required("title", &draft.title)?;
        required("company", &draft.company)?;
        Ok(())
    }

    // ========================================================================
    // Applications
    // ========================================================================

    /// Submit an application for `job_id`.
    ///
    /// Sent once, without retries. On success every cached applications
    /// listing is dropped.
    pub async fn apply_to_job(
        &self,
        job_id: &str,
        data: &ApplicationData,
    ) -> AppResult<ApplicationResult> {
        let job_id = job_id_arg("job_id", job_id)?;
        data.validate()?;
        let user_id = required("user_id", &data.user_id)?;

        let Some(fetcher) = &self.fetcher else {
            let _guard = self.store_writes.lock().await;
            let mut applications: Vec<ApplicationRecord> = self
                .store
                .read_collection(APPLICATIONS_COLLECTION)
                .await
                .map_err(|e| AppError::store("read applications", e))?;
            let application = ApplicationRecord {
                id: Uuid::new_v4().to_string(),
                job_id: job_id.to_string(),
                user_id: user_id.to_string(),
                submitted_at: Timestamp::now(),
                status: ApplicationStatus::Pending,
            };
            applications.push(application.clone());
            self.write_fallback(APPLICATIONS_COLLECTION, &applications)
                .await?;
            self.invalidate(APPLICATIONS_PATH).await;
            return Ok(ApplicationResult {
                application,
                source: DataSource::Fallback,
            });
        };

        let body = serde_json::to_value(data).map_err(anyhow::Error::from)?;
        let request = ApiRequest::post(JOBS_PATH, body)
            .with_segment(job_id)
            .with_segment("apply");
        let value = fetcher
            .request_with_retries(&request, 0)
            .await
            .map_err(|e| not_found_or(e, "job", job_id))?;

        let mut application = sanitize_application(extract_item(&value, "application"));
        if application.job_id.is_empty() {
            application.job_id = job_id.to_string();
        }
        if application.user_id.is_empty() {
            application.user_id = user_id.to_string();
        }

        self.invalidate(APPLICATIONS_PATH).await;
        tracing::info!(job_id, user_id, application_id = %application.id, "Application submitted");

        Ok(ApplicationResult {
            application,
            source: DataSource::Live,
        })
    }

    /// Applications submitted by `user_id`.
    ///
    /// On failure an empty list is returned together with the error.
    pub async fn get_user_applications(&self, user_id: &str) -> AppResult<ApplicationList> {
        let user_id = required("user_id", user_id)?;

        let Some(fetcher) = &self.fetcher else {
            let applications: Vec<ApplicationRecord> = self
                .store
                .read_collection(APPLICATIONS_COLLECTION)
                .await
                .map_err(|e| AppError::store("read applications", e))?;
            let applications: Vec<_> = applications
                .into_iter()
                .filter(|a| a.user_id == user_id)
                .collect();
            return Ok(ApplicationList {
                total: applications.len() as u64,
                applications,
                source: DataSource::Fallback,
                cached: false,
                error: None,
            });
        };

        let key = applications_key(user_id);
        if let Some(list) = self.cache_get::<ApplicationList>(&key).await {
            return Ok(ApplicationList {
                cached: true,
                ..list
            });
        }

        let request = ApiRequest::get(APPLICATIONS_PATH).with_query("user_id", user_id);
        let outcome = self
            .fetch_shared(fetcher, &key, request, self.ttls().applications_ttl(), |value| {
                Some(live_applications(value))
            })
            .await;

        match outcome {
            Ok(value) => Ok(live_applications(&value)),
            Err(err) => {
                tracing::warn!(user_id, error = %err, "Applications unavailable");
                Ok(ApplicationList::empty_with_error(
                    DataSource::Fallback,
                    err.to_string(),
                ))
            }
        }
    }

    // ========================================================================
    // Evaluation and health
    // ========================================================================

    /// Score a resume against a job description. Never cached.
    pub async fn evaluate_resume(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> AppResult<EvaluationResult> {
        let request = EvaluationRequest {
            resume_text: resume_text.trim().to_string(),
            job_description: job_description.trim().to_string(),
        };
        request.validate()?;

        let Some(fetcher) = &self.fetcher else {
            return Err(AppError::Unavailable {
                message: "resume evaluation requires the JobStir API".to_string(),
            });
        };

        let body = serde_json::to_value(&request).map_err(anyhow::Error::from)?;
        let value = fetcher
            .request(&ApiRequest::post(EVALUATE_PATH, body))
            .await?;

        Ok(sanitize_evaluation(extract_item(&value, "evaluation")))
    }

    /// Ask the API for its health. Never fails; problems are reported in the result.
    pub async fn check_health(&self) -> HealthReport {
        let Some(fetcher) = &self.fetcher else {
            return HealthReport {
                status: HealthStatus::Unhealthy,
                source: DataSource::Fallback,
                checked_at: Timestamp::now(),
                latency_ms: None,
                details: None,
                error: Some("API base URL not configured".to_string()),
            };
        };

        let started = Instant::now();
        let outcome = fetcher
            .request_with_retries(&ApiRequest::get(HEALTH_PATH), 0)
            .await;
        let latency_ms = Some(started.elapsed().as_millis() as u64);

        match outcome {
            Ok(details) => HealthReport {
                status: HealthStatus::Healthy,
                source: DataSource::Live,
                checked_at: Timestamp::now(),
                latency_ms,
                details: (!details.is_null()).then_some(details),
                error: None,
            },
            Err(err) => {
                tracing::warn!(error = %err, "Health check failed");
                HealthReport {
                    status: HealthStatus::Unhealthy,
                    source: DataSource::Live,
                    checked_at: Timestamp::now(),
                    latency_ms,
                    details: None,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Fetch `request` once for every concurrent caller of `key`.
    ///
    /// The shared future itself caches what `entry` makes of a successful
    /// response, so the entry is written even when the caller that started
    /// the flight is dropped before it finishes.
    async fn fetch_shared<T, F>(
        &self,
        fetcher: &ResilientFetcher,
        key: &str,
        request: ApiRequest,
        ttl: Duration,
        entry: F,
    ) -> FetchOutcome
    where
        T: Serialize + Send + Sync + 'static,
        F: FnOnce(&Value) -> Option<T> + Send + 'static,
    {
        let fetcher = fetcher.clone();
        let cache = self.cache.clone();
        let cache_key = key.to_string();
        let flight = self
            .flights
            .run(key, move || async move {
                let outcome = fetcher.request(&request).await;
                if let Ok(value) = &outcome
                    && let Some(entry) = entry(value)
                    && let Err(e) = cache.set_json(&cache_key, &entry, Some(ttl)).await
                {
                    tracing::warn!(key = %cache_key, error = %e, "Cache write failed");
                }
                outcome
            })
            .await;
        flight.value
    }

    /// Cache read where a failing backend counts as a miss.
    async fn cache_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.cache.get_json(key).await.unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "Cache read failed");
            None
        })
    }

    async fn invalidate(&self, namespace: &str) {
        match self.cache.clear(Some(namespace)).await {
            Ok(removed) => tracing::debug!(namespace, removed, "Cache namespace invalidated"),
            Err(e) => tracing::warn!(namespace, error = %e, "Cache invalidation failed"),
        }
    }

    async fn seed_placeholders(&self) -> AppResult<()> {
        let _guard = self.store_writes.lock().await;
        if self.read_fallback_jobs().await?.is_empty() {
            self.write_fallback(JOBS_COLLECTION, &placeholder_jobs())
                .await?;
            tracing::debug!("Seeded fallback store with placeholder jobs");
        }
        Ok(())
    }

    /// Stored jobs, sanitized; records without an id are skipped.
    async fn read_fallback_jobs(&self) -> AppResult<Vec<JobRecord>> {
        let raw: Vec<Value> = self
            .store
            .read_collection(JOBS_COLLECTION)
            .await
            .map_err(|e| AppError::store("read jobs", e))?;
        let jobs = sanitize_jobs(&raw);
        if jobs.len() < raw.len() {
            tracing::warn!(dropped = raw.len() - jobs.len(), "Skipping stored jobs without an id");
        }
        Ok(jobs)
    }

    /// Jobs to show when the API is not answering. Never empty for an empty
    /// filter set.
    async fn fallback_jobs(&self, filters: &FilterSet) -> Vec<JobRecord> {
        let stored = self.read_fallback_jobs().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Fallback store unreadable");
            Vec::new()
        });
        let jobs = if stored.is_empty() {
            placeholder_jobs()
        } else {
            stored
        };
        jobs.into_iter().filter(|job| job.matches(filters)).collect()
    }

    async fn find_fallback_job(&self, job_id: &str) -> Option<JobRecord> {
        self.fallback_jobs(&FilterSet::new())
            .await
            .into_iter()
            .find(|job| job.id == job_id)
    }

    async fn write_fallback<T: Serialize>(&self, collection: &str, records: &[T]) -> AppResult<()> {
        self.store
            .write_collection(collection, records)
            .await
            .map_err(|e| AppError::store(format!("write {collection}"), e))
    }
}
