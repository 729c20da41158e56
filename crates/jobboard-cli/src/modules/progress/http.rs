use jobboard_core::endpoints::VACANCY_PROGRESS;
use jobboard_core::ProgressCreate;
use jobboard_session::ApiRequest;

use crate::modules::system::http::path_with_id;

pub(crate) fn list_progress() -> ApiRequest {
    ApiRequest::get(VACANCY_PROGRESS)
}

pub(crate) fn create_progress(payload: &ProgressCreate) -> anyhow::Result<ApiRequest> {
    Ok(ApiRequest::post(VACANCY_PROGRESS).with_json(serde_json::to_value(payload)?))
}

pub(crate) fn delete_progress(id: &str) -> ApiRequest {
    ApiRequest::delete(path_with_id(VACANCY_PROGRESS, id))
}
