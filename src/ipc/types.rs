use crate::resolution::ResolutionWorkflow;
use crate::settings::Settings;
use crate::store::ScheduleStore;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub store: ScheduleStore,
    pub workflow: ResolutionWorkflow,
    pub settings: Settings,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            store: ScheduleStore::default(),
            workflow: ResolutionWorkflow::default(),
            settings,
        }
    }
}
