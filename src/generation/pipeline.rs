//! Sprite generation pipeline.
//!
//! Chains the two Scenario jobs that produce a transparent sprite sheet:
//! img2img generation from a reference sheet, then background removal on the
//! generated asset. The final PNG is downloaded and written to disk.

use std::path::Path;

use crate::api::{HttpTransport, ScenarioApi, Transport};
use crate::config::{PollConfig, SpriteConfig};
use crate::error::{Result, SpriteError};
use crate::types::{AssetId, GenerationRequest, OutputFile};

use super::poller::{poll_job, Pause, ThreadSleep};

/// Runs sprite requests against one Scenario API client.
///
/// Holds no per-request state; a pipeline can run any number of requests
/// one after another.
pub struct SpritePipeline<T, P = ThreadSleep> {
    api: ScenarioApi<T>,
    poll: PollConfig,
    pause: P,
}

impl SpritePipeline<HttpTransport> {
    /// Builds a pipeline talking to the real API described by `config`.
    pub fn from_config(config: &SpriteConfig) -> Result<Self> {
        let transport = HttpTransport::new(
            config.api_url.clone(),
            config.credentials.clone(),
            config.http_timeout,
        )?;
        Ok(Self::new(ScenarioApi::new(transport), config.poll))
    }
}

impl<T: Transport> SpritePipeline<T> {
    pub fn new(api: ScenarioApi<T>, poll: PollConfig) -> Self {
        Self::with_pause(api, poll, ThreadSleep)
    }
}

impl<T: Transport, P: Pause> SpritePipeline<T, P> {
    /// Builds a pipeline with a custom wait primitive between status checks.
    pub fn with_pause(api: ScenarioApi<T>, poll: PollConfig, pause: P) -> Self {
        Self { api, poll, pause }
    }

    pub fn api(&self) -> &ScenarioApi<T> {
        &self.api
    }

    pub fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    /// Runs img2img generation and returns the first generated asset.
    pub fn generate(&self, request: &GenerationRequest) -> Result<AssetId> {
        request.validate()?;

        tracing::info!(
            prompt = %request.prompt,
            model_id = %request.model_id,
            "submitting img2img job"
        );
        let job = self.api.submit_img2img(request)?;
        tracing::info!(job_id = %job, "generation job started");

        let status = poll_job(&self.api, &job, &self.poll, &self.pause)?;

        if status.outputs.is_empty() {
            return Err(SpriteError::protocol(format!(
                "No outputs found for generation job {}",
                job
            )));
        }

        let asset = status.first_asset_id().cloned().ok_or_else(|| {
            SpriteError::protocol(format!(
                "First output of generation job {} has no asset IDs",
                job
            ))
        })?;

        tracing::info!(asset_id = %asset, "generated image asset");
        Ok(asset)
    }

    /// Removes the background from `asset` and returns the PNG download URL.
    pub fn remove_background(&self, asset: &AssetId) -> Result<String> {
        tracing::info!(asset_id = %asset, "submitting background removal job");
        let job = self.api.submit_remove_background(asset)?;
        tracing::info!(job_id = %job, "background removal job started");

        let status = poll_job(&self.api, &job, &self.poll, &self.pause)?;

        if status.outputs.is_empty() {
            return Err(SpriteError::protocol(format!(
                "No outputs found for background removal job {}",
                job
            )));
        }

        let url = status.first_url().map(str::to_string).ok_or_else(|| {
            SpriteError::protocol(format!(
                "First output of background removal job {} has no url",
                job
            ))
        })?;

        tracing::info!(%url, "final image ready");
        Ok(url)
    }

    /// Generates, removes the background, downloads, and writes the sprite
    /// sheet to `output_path`, replacing any existing file.
    pub fn run_sprite_generation(
        &self,
        request: &GenerationRequest,
        output_path: &Path,
    ) -> Result<OutputFile> {
        let asset = self.generate(request)?;
        let url = self.remove_background(&asset)?;

        let bytes = self.api.download(&url)?;
        std::fs::write(output_path, &bytes)
            .map_err(|e| SpriteError::output_write_failed(output_path, e))?;

        let output = OutputFile::new(output_path, &bytes);
        tracing::info!(
            path = %output.path.display(),
            bytes = output.bytes_written,
            hash = %output.content_hash,
            "sprite sheet saved"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{IMG2IMG_PATH, REMOVE_BACKGROUND_PATH};
    use crate::error::ErrorCode;
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};
    use std::time::Duration;

    /// Routes requests by path to queued replies and records every call.
    #[derive(Default)]
    struct RoutedTransport {
        routes: RefCell<HashMap<String, VecDeque<Result<Value>>>>,
        downloads: HashMap<String, Vec<u8>>,
        calls: RefCell<Vec<String>>,
    }

    impl RoutedTransport {
        fn reply(self, path: &str, value: Value) -> Self {
            self.routes
                .borrow_mut()
                .entry(path.to_string())
                .or_default()
                .push_back(Ok(value));
            self
        }

        fn fail(self, path: &str, err: SpriteError) -> Self {
            self.routes
                .borrow_mut()
                .entry(path.to_string())
                .or_default()
                .push_back(Err(err));
            self
        }

        fn serve(mut self, url: &str, bytes: &[u8]) -> Self {
            self.downloads.insert(url.to_string(), bytes.to_vec());
            self
        }

        fn next(&self, path: &str) -> Result<Value> {
            self.calls.borrow_mut().push(path.to_string());
            self.routes
                .borrow_mut()
                .get_mut(path)
                .and_then(|q| q.pop_front())
                .unwrap_or_else(|| Err(SpriteError::http_status(404, path, "no route")))
        }
    }

    impl Transport for RoutedTransport {
        fn post_json(&self, path: &str, _body: &Value) -> Result<Value> {
            self.next(path)
        }

        fn get_json(&self, path: &str) -> Result<Value> {
            self.next(path)
        }

        fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
            self.calls.borrow_mut().push(url.to_string());
            self.downloads
                .get(url)
                .cloned()
                .ok_or_else(|| SpriteError::http_status(404, url, ""))
        }
    }

    struct NoPause;

    impl Pause for NoPause {
        fn pause(&self, _duration: Duration) {}
    }

    fn pipeline(transport: RoutedTransport) -> SpritePipeline<RoutedTransport, NoPause> {
        SpritePipeline::with_pause(ScenarioApi::new(transport), PollConfig::default(), NoPause)
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("8-bit RPG wizard", "asset_ref", "model_x")
    }

    fn generated(asset: &str) -> Value {
        json!({"status": "success", "outputs": [{"assetIds": [asset]}]})
    }

    fn cleaned(url: &str) -> Value {
        json!({"status": "success", "outputs": [{"url": url}]})
    }

    fn happy_transport() -> RoutedTransport {
        RoutedTransport::default()
            .reply(IMG2IMG_PATH, json!({"jobId": "gen_1"}))
            .reply("/jobs/gen_1", json!({"status": "in-progress", "progress": 0.4}))
            .reply("/jobs/gen_1", generated("A1"))
            .reply(REMOVE_BACKGROUND_PATH, json!({"jobId": "bg_1"}))
            .reply("/jobs/bg_1", cleaned("https://cdn/U.png"))
            .serve("https://cdn/U.png", b"PNGDATA")
    }

    #[test]
    fn generate_returns_first_asset() {
        let p = pipeline(happy_transport());
        let asset = p.generate(&request()).unwrap();
        assert_eq!(asset.as_str(), "A1");
        assert_eq!(
            *p.api().transport().calls.borrow(),
            vec![IMG2IMG_PATH, "/jobs/gen_1", "/jobs/gen_1"]
        );
    }

    #[test]
    fn generate_without_job_id_does_not_poll() {
        let p = pipeline(RoutedTransport::default().reply(IMG2IMG_PATH, json!({"id": "x"})));
        let err = p.generate(&request()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Protocol);
        assert_eq!(*p.api().transport().calls.borrow(), vec![IMG2IMG_PATH]);
    }

    #[test]
    fn generate_with_empty_outputs_is_protocol_error() {
        let p = pipeline(
            RoutedTransport::default()
                .reply(IMG2IMG_PATH, json!({"jobId": "gen_1"}))
                .reply("/jobs/gen_1", json!({"status": "success", "outputs": []})),
        );
        let err = p.generate(&request()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Protocol);
    }

    #[test]
    fn generate_with_no_asset_ids_is_protocol_error() {
        let p = pipeline(
            RoutedTransport::default()
                .reply(IMG2IMG_PATH, json!({"jobId": "gen_1"}))
                .reply("/jobs/gen_1", json!({"status": "success", "outputs": [{"assetIds": []}]})),
        );
        assert_eq!(p.generate(&request()).unwrap_err().code, ErrorCode::Protocol);
    }

    #[test]
    fn generate_surfaces_http_errors() {
        let p = pipeline(
            RoutedTransport::default()
                .fail(IMG2IMG_PATH, SpriteError::http_status(400, IMG2IMG_PATH, "bad model")),
        );
        assert_eq!(p.generate(&request()).unwrap_err().code, ErrorCode::Transport);
    }

    #[test]
    fn invalid_request_is_never_submitted() {
        let p = pipeline(RoutedTransport::default());
        let err = p.generate(&request().with_strength(2.0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
        assert!(p.api().transport().calls.borrow().is_empty());
    }

    #[test]
    fn remove_background_without_url_is_protocol_error() {
        let p = pipeline(
            RoutedTransport::default()
                .reply(REMOVE_BACKGROUND_PATH, json!({"jobId": "bg_1"}))
                .reply("/jobs/bg_1", generated("B1")),
        );
        let err = p.remove_background(&AssetId::new("A1")).unwrap_err();
        assert_eq!(err.code, ErrorCode::Protocol);
    }

    #[test]
    fn remove_background_without_job_id_does_not_poll() {
        let p = pipeline(RoutedTransport::default().reply(REMOVE_BACKGROUND_PATH, json!({})));
        let err = p.remove_background(&AssetId::new("A1")).unwrap_err();
        assert_eq!(err.code, ErrorCode::Protocol);
        assert_eq!(*p.api().transport().calls.borrow(), vec![REMOVE_BACKGROUND_PATH]);
    }

    #[test]
    fn remove_background_with_empty_outputs_is_protocol_error() {
        let p = pipeline(
            RoutedTransport::default()
                .reply(REMOVE_BACKGROUND_PATH, json!({"jobId": "bg_1"}))
                .reply("/jobs/bg_1", json!({"status": "success", "outputs": []})),
        );
        let err = p.remove_background(&AssetId::new("A1")).unwrap_err();
        assert_eq!(err.code, ErrorCode::Protocol);
    }

    #[test]
    fn remove_background_surfaces_http_errors() {
        let p = pipeline(RoutedTransport::default().fail(
            REMOVE_BACKGROUND_PATH,
            SpriteError::http_status(500, REMOVE_BACKGROUND_PATH, "upstream down"),
        ));
        let err = p.remove_background(&AssetId::new("A1")).unwrap_err();
        assert_eq!(err.code, ErrorCode::Transport);
        assert_eq!(*p.api().transport().calls.borrow(), vec![REMOVE_BACKGROUND_PATH]);
    }

    #[test]
    fn remote_failure_aborts_pipeline() {
        let p = pipeline(
            RoutedTransport::default()
                .reply(IMG2IMG_PATH, json!({"jobId": "gen_1"}))
                .reply("/jobs/gen_1", json!({"status": "failure", "error": "bad prompt"})),
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wizard_scenario.png");

        let err = p.run_sprite_generation(&request(), &path).unwrap_err();

        assert_eq!(err.code, ErrorCode::RemoteJobFailure);
        assert!(!path.exists());
        assert!(!p
            .api()
            .transport()
            .calls
            .borrow()
            .iter()
            .any(|c| c == REMOVE_BACKGROUND_PATH));
    }

    #[test]
    fn run_writes_downloaded_bytes() {
        let p = pipeline(happy_transport());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wizard_scenario.png");
        std::fs::write(&path, b"stale").unwrap();

        let output = p.run_sprite_generation(&request(), &path).unwrap();

        assert_eq!(output.path, path);
        assert_eq!(output.bytes_written, 7);
        assert_eq!(std::fs::read(&path).unwrap(), b"PNGDATA");
    }

    #[test]
    fn download_failure_is_transport_error() {
        let transport = RoutedTransport::default()
            .reply(IMG2IMG_PATH, json!({"jobId": "gen_1"}))
            .reply("/jobs/gen_1", generated("A1"))
            .reply(REMOVE_BACKGROUND_PATH, json!({"jobId": "bg_1"}))
            .reply("/jobs/bg_1", cleaned("https://cdn/gone.png"));
        let p = pipeline(transport);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        let err = p.run_sprite_generation(&request(), &path).unwrap_err();

        assert_eq!(err.code, ErrorCode::Transport);
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_path_is_output_error() {
        let p = pipeline(happy_transport());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");

        let err = p.run_sprite_generation(&request(), &path).unwrap_err();
        assert_eq!(err.code, ErrorCode::OutputWriteFailed);
    }
}
