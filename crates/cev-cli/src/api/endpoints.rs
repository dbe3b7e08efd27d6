//! API endpoint URL builders
//!
//! The backend mounts everything under `/api` and expects trailing slashes.

use cev_common::types::DatasetId;

fn api_root(base_url: &str) -> String {
    format!("{}/api", base_url.trim_end_matches('/'))
}

pub fn register_url(base_url: &str) -> String {
    format!("{}/auth/register/", api_root(base_url))
}

pub fn login_url(base_url: &str) -> String {
    format!("{}/auth/login/", api_root(base_url))
}

pub fn logout_url(base_url: &str) -> String {
    format!("{}/auth/logout/", api_root(base_url))
}

pub fn current_user_url(base_url: &str) -> String {
    format!("{}/auth/user/", api_root(base_url))
}

pub fn datasets_url(base_url: &str) -> String {
    format!("{}/datasets/", api_root(base_url))
}

pub fn dataset_url(base_url: &str, id: DatasetId) -> String {
    format!("{}/datasets/{}/", api_root(base_url), id)
}

pub fn dataset_summary_url(base_url: &str, id: DatasetId) -> String {
    format!("{}/datasets/{}/summary/", api_root(base_url), id)
}

pub fn upload_url(base_url: &str) -> String {
    format!("{}/datasets/upload/", api_root(base_url))
}

pub fn report_url(base_url: &str, id: DatasetId) -> String {
    format!("{}/datasets/{}/report/", api_root(base_url), id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_urls() {
        assert_eq!(register_url("http://localhost:8000"), "http://localhost:8000/api/auth/register/");
        assert_eq!(login_url("http://localhost:8000"), "http://localhost:8000/api/auth/login/");
        assert_eq!(logout_url("http://localhost:8000"), "http://localhost:8000/api/auth/logout/");
        assert_eq!(current_user_url("http://localhost:8000"), "http://localhost:8000/api/auth/user/");
    }

    #[test]
    fn test_dataset_urls() {
        let id = DatasetId(42);
        assert_eq!(datasets_url("http://localhost:8000"), "http://localhost:8000/api/datasets/");
        assert_eq!(dataset_url("http://localhost:8000", id), "http://localhost:8000/api/datasets/42/");
        assert_eq!(
            dataset_summary_url("http://localhost:8000", id),
            "http://localhost:8000/api/datasets/42/summary/"
        );
        assert_eq!(upload_url("http://localhost:8000"), "http://localhost:8000/api/datasets/upload/");
        assert_eq!(report_url("http://localhost:8000", id), "http://localhost:8000/api/datasets/42/report/");
    }

    #[test]
    fn test_trailing_slash_on_base_is_ignored() {
        assert_eq!(datasets_url("https://cev.example.com/"), "https://cev.example.com/api/datasets/");
    }
}
