use jobboard_core::endpoints::VACANCIES;
use jobboard_core::VacancyQuery;
use jobboard_session::ApiRequest;

use crate::modules::system::http::path_with_id;

pub(crate) fn list_vacancies(query: &VacancyQuery) -> ApiRequest {
    ApiRequest::get(VACANCIES).with_query(query.to_params())
}

pub(crate) fn get_vacancy(id: &str) -> ApiRequest {
    ApiRequest::get(path_with_id(VACANCIES, id))
}
