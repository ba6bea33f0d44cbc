//! Endpoint handlers.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use augmentor_core::decode::decode_file;
use augmentor_core::storage::{
    archive_name, existing_file, resolve_output_dir, validate_bare_name, write_archive,
    UploadReceiver,
};
use augmentor_core::{
    extract_frames, pipeline, AugmentConfig, AugmentError, AugmentResult, FfmpegVideo,
    OutputBundle, TransformPlan, VideoError, VideoPlan, VideoSource,
};
use tracing::info;

use crate::api::{
    DownloadedFile, OutputPathsResponse, ProcessRequest, ProcessResponse, ProcessVideoRequest,
    ProcessVideoResponse, UploadResponse,
};

/// Handles the five operations against one set of storage roots.
///
/// Requests that write the same output folder run one at a time; requests
/// for different folders do not wait on each other.
pub struct Service {
    config: AugmentConfig,
    uploads: UploadReceiver,
    folder_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Service {
    /// Validate `config` and create the storage roots.
    pub fn new(config: AugmentConfig) -> AugmentResult<Self> {
        config.validate()?;
        config.storage.ensure_dirs()?;
        let uploads = UploadReceiver::new(&config.storage.upload_dir, config.max_upload_bytes);
        Ok(Self {
            config,
            uploads,
            folder_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &AugmentConfig {
        &self.config
    }

    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub fn upload(&self, original_name: &str, bytes: &[u8]) -> AugmentResult<UploadResponse> {
        let stored = self.uploads.receive(original_name, bytes)?;
        Ok(UploadResponse {
            success: true,
            filename: stored.filename,
            message: "File uploaded successfully".to_string(),
        })
    }

    /// Run the image pipeline on a stored upload and zip the artifacts.
    #[tracing::instrument(skip(self))]
    pub fn process(&self, request: &ProcessRequest) -> AugmentResult<ProcessResponse> {
        let plan = TransformPlan::resolve(&request.selected_options)?;
        let folder = validate_bare_name(request.folder())?.to_string();
        let source = existing_file(&self.config.storage.upload_dir, &request.filename)?;

        let image = decode_file(&source)?;
        plan.check_source(image.width, image.height)?;

        let (bundle, zip_file) = self.with_folder_lock(&folder, || {
            let custom = request.custom_base();
            let output_dir = resolve_output_dir(
                &self.config.storage.processed_dir,
                &folder,
                custom.as_deref(),
            )?;
            let bundle = pipeline::process(&image, &plan, &output_dir, self.config.jpeg_quality)?;
            let zip_file = self.archive(&folder, &bundle)?;
            Ok((bundle, zip_file))
        })?;

        Ok(ProcessResponse {
            success: true,
            message: format!("{} images processed and saved", bundle.len()),
            processed_count: bundle.len(),
            zip_file,
        })
    }

    /// Extract frames from a stored video with `ffprobe`/`ffmpeg`.
    pub fn process_video(
        &self,
        request: &ProcessVideoRequest,
    ) -> AugmentResult<ProcessVideoResponse> {
        let ffprobe = self.config.ffprobe_bin.clone();
        let ffmpeg = self.config.ffmpeg_bin.clone();
        self.process_video_with(request, |path| FfmpegVideo::open(path, &ffprobe, &ffmpeg))
    }

    /// Extract frames, opening the video with `open`.
    #[tracing::instrument(skip(self, open))]
    pub fn process_video_with<S, F>(
        &self,
        request: &ProcessVideoRequest,
        open: F,
    ) -> AugmentResult<ProcessVideoResponse>
    where
        S: VideoSource,
        F: FnOnce(&Path) -> Result<S, VideoError>,
    {
        let plan = VideoPlan::resolve(
            request.start_time,
            request.end_time,
            &request.selected_options,
        )?;
        let folder = validate_bare_name(request.folder())?.to_string();
        let source_path = existing_file(&self.config.storage.upload_dir, &request.filename)?;

        let (bundle, zip_file, info) = self.with_folder_lock(&folder, || {
            let custom = request.custom_base();
            let output_dir = resolve_output_dir(
                &self.config.storage.processed_dir,
                &folder,
                custom.as_deref(),
            )?;

            let mut video = open(&source_path)?;
            let info = video.info();
            let bundle = extract_frames(&mut video, &plan, &output_dir, self.config.jpeg_quality)?;
            let zip_file = self.archive(&folder, &bundle)?;
            Ok((bundle, zip_file, info))
        })?;

        Ok(ProcessVideoResponse {
            success: true,
            message: format!("{} frames extracted and saved", bundle.len()),
            processed_count: bundle.len(),
            zip_file,
            start_time: plan.start_time,
            end_time: plan.end_time.unwrap_or_else(|| info.duration()),
        })
    }

    /// Look up a file in the processed root.
    pub fn download(&self, name: &str) -> AugmentResult<DownloadedFile> {
        let path = existing_file(&self.config.storage.processed_dir, name)?;
        let size = fs::metadata(&path)
            .map_err(|e| AugmentError::processing(format!("{}: {e}", path.display())))?
            .len();
        Ok(DownloadedFile {
            filename: name.trim().to_string(),
            path,
            size,
        })
    }

    /// Suggested output locations and the absolute processed root.
    pub fn output_paths(&self) -> OutputPathsResponse {
        let processed = &self.config.storage.processed_dir;
        let current_path = std::path::absolute(processed)
            .unwrap_or_else(|_| processed.clone())
            .display()
            .to_string();

        let default_paths = dirs::home_dir()
            .map(|home| {
                ["Desktop", "Documents", "Pictures", "Downloads"]
                    .iter()
                    .map(|d| home.join(d).display().to_string())
                    .collect()
            })
            .unwrap_or_default();

        OutputPathsResponse {
            current_path,
            default_paths,
            system: system_name().to_string(),
        }
    }

    fn archive(&self, folder: &str, bundle: &OutputBundle) -> AugmentResult<String> {
        let zip_file = archive_name(folder);
        let zip_path = self.config.storage.processed_dir.join(&zip_file);
        write_archive(&zip_path, bundle.entries())?;
        info!(zip = %zip_file, entries = bundle.len(), "request finished");
        Ok(zip_file)
    }

    /// Run `work` while holding the lock for `folder`.
    ///
    /// The lock entry is dropped from the map once no other request holds
    /// or waits on it, so the map only tracks folders in use.
    fn with_folder_lock<T>(
        &self,
        folder: &str,
        work: impl FnOnce() -> AugmentResult<T>,
    ) -> AugmentResult<T> {
        let lock = self.folder_lock(folder);
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            work()
        };
        self.release_folder(folder, &lock);
        result
    }

    fn release_folder(&self, folder: &str, lock: &Arc<Mutex<()>>) {
        let mut locks = self
            .folder_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one held by the caller.
        if Arc::strong_count(lock) == 2 {
            locks.remove(folder);
        }
    }

    fn folder_lock(&self, folder: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .folder_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(folder.to_string()).or_default())
    }
}

/// Operating system name in the form browsers and Python report it.
fn system_name() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "windows" => "Windows",
        "macos" => "Darwin",
        "freebsd" => "FreeBSD",
        other => other,
    }
}
