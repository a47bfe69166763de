//! In-memory doubles and fixtures shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::config::Config;
use crate::documents::repository::{ArtifactRepository, HistoryFilter, NewArtifact};
use crate::documents::DocumentStore;
use crate::encode::FormatEncoder;
use crate::errors::AppError;
use crate::generation::synthesizer::{ContentSynthesizer, SynthesisError};
use crate::generation::{DocumentPipeline, GenerationService};
use crate::models::document::{DocumentKind, GeneratedArtifact, OutputFormat};
use crate::models::profile::{ApplicantProfile, OpportunityRecord};
use crate::providers::{OpportunityProvider, ProfileProvider};
use crate::render::TemplateRenderer;
use crate::state::AppState;
use crate::storage::{BlobStorage, StorageError, StorageResult};

pub const FIXTURE_USER_ID: Uuid = Uuid::from_u128(0x5eed_0000_0000_4000_8000_0000_0000_0001);
pub const FIXTURE_OPPORTUNITY_ID: Uuid =
    Uuid::from_u128(0x5eed_0000_0000_4000_8000_0000_0000_0002);

// ────────────────────────────────────────────────────────────────────────────
// Blob storage
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryBlobStorage {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
}

impl InMemoryBlobStorage {
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(key)
    }

    /// Drops bytes behind the store's back.
    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.lock().unwrap().remove(key)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStorage {
    async fn write(&self, key: &str, data: Vec<u8>, _content_type: &str) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed(format!("refused write to {key}")));
        }
        self.blobs.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed(format!("refused delete of {key}")));
        }
        self.blobs.lock().unwrap().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.contains(key))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Artifact repository
// ────────────────────────────────────────────────────────────────────────────

/// Rows keep their insertion sequence so newest-first ordering is stable even when
/// two inserts share a timestamp.
#[derive(Default)]
pub struct InMemoryArtifactRepository {
    rows: Mutex<Vec<(u64, GeneratedArtifact)>>,
    next_seq: AtomicUsize,
    inserts: AtomicUsize,
    fail_inserts: AtomicBool,
    fail_after: Mutex<Option<usize>>,
}

impl InMemoryArtifactRepository {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Lets `n` further inserts succeed, then fails every one after.
    pub fn fail_inserts_after(&self, n: usize) {
        let done = self.inserts.load(Ordering::SeqCst);
        *self.fail_after.lock().unwrap() = Some(done + n);
    }
}

/// Same predicate the SQL `WHERE` clause applies.
fn history_filter_matches(filter: &HistoryFilter, artifact: &GeneratedArtifact) -> bool {
    filter.kind.map_or(true, |k| k == artifact.kind)
        && filter.format.map_or(true, |f| f == artifact.format)
}

#[async_trait]
impl ArtifactRepository for InMemoryArtifactRepository {
    async fn insert(&self, artifact: NewArtifact) -> Result<GeneratedArtifact, AppError> {
        let attempt = self.inserts.fetch_add(1, Ordering::SeqCst);
        let over_limit = self
            .fail_after
            .lock()
            .unwrap()
            .map_or(false, |limit| attempt >= limit);
        if self.fail_inserts.load(Ordering::SeqCst) || over_limit {
            return Err(AppError::Persistence("insert refused".to_string()));
        }

        let row = GeneratedArtifact {
            id: artifact.id,
            user_id: artifact.user_id,
            kind: artifact.kind,
            format: artifact.format,
            storage_key: artifact.storage_key,
            filename: artifact.filename,
            size_bytes: artifact.size_bytes,
            metadata: artifact.metadata,
            created_at: Utc::now(),
        };
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) as u64;
        self.rows.lock().unwrap().push((seq, row.clone()));
        Ok(row)
    }

    async fn list_by_owner(
        &self,
        user_id: Uuid,
        filter: HistoryFilter,
    ) -> Result<Vec<GeneratedArtifact>, AppError> {
        let mut rows: Vec<(u64, GeneratedArtifact)> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, a)| a.user_id == user_id && history_filter_matches(&filter, a))
            .cloned()
            .collect();
        rows.sort_by(|(sa, a), (sb, b)| b.created_at.cmp(&a.created_at).then(sb.cmp(sa)));
        Ok(rows.into_iter().map(|(_, a)| a).collect())
    }

    async fn find(&self, id: Uuid, user_id: Uuid) -> Result<Option<GeneratedArtifact>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|(_, a)| a.id == id && a.user_id == user_id)
            .map(|(_, a)| a.clone()))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(_, a)| !(a.id == id && a.user_id == user_id));
        Ok(rows.len() != before)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Synthesis
// ────────────────────────────────────────────────────────────────────────────

/// Replies with canned text and records every prompt it sees.
pub struct ScriptedSynthesizer {
    reply: String,
    fail_on: Option<usize>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedSynthesizer {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail_on: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fails the `n`th call (1-based); every other call succeeds.
    pub fn failing_on_call(n: usize) -> Self {
        Self {
            fail_on: Some(n),
            ..Self::replying("Contenu généré.")
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentSynthesizer for ScriptedSynthesizer {
    async fn synthesize(&self, prompt: &str, _correlation_id: Uuid) -> Result<String, SynthesisError> {
        let call = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len()
        };
        if self.fail_on == Some(call) {
            return Err(SynthesisError::Unavailable("scripted outage".to_string()));
        }
        Ok(self.reply.clone())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Upstream providers
// ────────────────────────────────────────────────────────────────────────────

pub struct StaticProviders {
    profile: ApplicantProfile,
    opportunity: OpportunityRecord,
}

impl Default for StaticProviders {
    fn default() -> Self {
        Self {
            profile: fixture_profile(),
            opportunity: fixture_opportunity(),
        }
    }
}

#[async_trait]
impl ProfileProvider for StaticProviders {
    async fn profile(&self, user_id: Uuid) -> Result<ApplicantProfile, AppError> {
        if user_id == self.profile.user_id {
            Ok(self.profile.clone())
        } else {
            Err(AppError::NotFound(format!("Profile for user {user_id}")))
        }
    }
}

#[async_trait]
impl OpportunityProvider for StaticProviders {
    async fn opportunity(&self, id: Uuid) -> Result<OpportunityRecord, AppError> {
        if id == self.opportunity.id {
            Ok(self.opportunity.clone())
        } else {
            Err(AppError::NotFound(format!("Opportunity {id}")))
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────

pub fn fixture_profile() -> ApplicantProfile {
    ApplicantProfile {
        user_id: FIXTURE_USER_ID,
        first_name: "Awa".to_string(),
        last_name: "Diop".to_string(),
        email: Some("awa@example.com".to_string()),
        phone: Some("+221 77 000 00 00".to_string()),
        address: Some("12 rue des Baobabs, Dakar".to_string()),
        location: Some("Dakar".to_string()),
        skills: Some("Agronomie, capteurs IoT, gestion de projet".to_string()),
        experience: Some("5 ans chez une coopérative agricole".to_string()),
        education: Some("Master en agronomie".to_string()),
        languages: Some("Français, Wolof, Anglais".to_string()),
        ..Default::default()
    }
}

pub fn fixture_opportunity() -> OpportunityRecord {
    OpportunityRecord {
        id: FIXTURE_OPPORTUNITY_ID,
        title: "Lead".to_string(),
        description: Some("Accompagnement des startups agricoles".to_string()),
        organization: Some("Acme".to_string()),
        sectors: vec!["Agritech".to_string()],
        amount: Some("50 000 EUR".to_string()),
        deadline: NaiveDate::from_ymd_opt(2026, 12, 31),
    }
}

pub fn fixture_artifact(kind: DocumentKind) -> GeneratedArtifact {
    let filename = format!("{kind}_1760832000_abcd1234.pdf");
    GeneratedArtifact {
        id: Uuid::new_v4(),
        user_id: FIXTURE_USER_ID,
        kind,
        format: OutputFormat::Pdf,
        storage_key: crate::storage::document_key(FIXTURE_USER_ID, &filename),
        filename,
        size_bytes: 0,
        metadata: None,
        created_at: Utc::now(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wiring
// ────────────────────────────────────────────────────────────────────────────

type Doubles = (Arc<InMemoryArtifactRepository>, Arc<InMemoryBlobStorage>);

fn store_with_doubles() -> (Arc<DocumentStore>, Doubles) {
    let repo = Arc::new(InMemoryArtifactRepository::default());
    let blobs = Arc::new(InMemoryBlobStorage::default());
    let store = Arc::new(DocumentStore::new(repo.clone(), blobs.clone()));
    (store, (repo, blobs))
}

fn pipeline_over(synth: Arc<ScriptedSynthesizer>, store: Arc<DocumentStore>) -> DocumentPipeline {
    let renderer = TemplateRenderer::new()
        .unwrap()
        .with_fixed_date(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
    DocumentPipeline::new(synth, renderer, FormatEncoder::new(), store)
}

pub fn pipeline_with(
    synth: Arc<ScriptedSynthesizer>,
) -> (DocumentPipeline, Arc<InMemoryArtifactRepository>, Arc<InMemoryBlobStorage>) {
    let (store, (repo, blobs)) = store_with_doubles();
    (pipeline_over(synth, store), repo, blobs)
}

pub fn service_with(
    synth: Arc<ScriptedSynthesizer>,
) -> (GenerationService, Arc<InMemoryArtifactRepository>, Arc<InMemoryBlobStorage>) {
    let (pipeline, repo, blobs) = pipeline_with(synth);
    let providers = Arc::new(StaticProviders::default());
    (
        GenerationService::new(providers.clone(), providers, pipeline),
        repo,
        blobs,
    )
}

pub fn app_state(
    synth: Arc<ScriptedSynthesizer>,
) -> (AppState, Arc<InMemoryArtifactRepository>, Arc<InMemoryBlobStorage>) {
    let (store, (repo, blobs)) = store_with_doubles();
    let providers = Arc::new(StaticProviders::default());
    let generation = GenerationService::new(
        providers.clone(),
        providers,
        pipeline_over(synth, store.clone()),
    );
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://localhost/dossier_test".to_string()),
        "ANTHROPIC_API_KEY" => Some("sk-test".to_string()),
        _ => None,
    })
    .unwrap();

    let state = AppState {
        generation: Arc::new(generation),
        store,
        config,
    };
    (state, repo, blobs)
}
