use std::sync::Arc;

use crate::auth::Authenticator;
use crate::config::Config;
use crate::db::VoucherStore;
use crate::drive::CloudStore;
use crate::ingest::{ScanService, UploadService};
use crate::ocr::OcrRace;
use crate::storage::CaptureStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub captures: CaptureStore,
    pub auth: Authenticator,
    pub scans: ScanService,
    pub uploads: UploadService,
}

impl AppState {
    pub fn new(
        config: Config,
        ocr: OcrRace,
        store: Arc<dyn VoucherStore>,
        cloud: Arc<dyn CloudStore>,
        auth: Authenticator,
    ) -> Self {
        let config = Arc::new(config);
        let captures = CaptureStore::new(&config.storage.captured_dir);
        let scans = ScanService::new(ocr, captures.clone());
        let uploads = UploadService::new(&config, store, cloud, auth.clone());

        Self {
            config,
            captures,
            auth,
            scans,
            uploads,
        }
    }
}
