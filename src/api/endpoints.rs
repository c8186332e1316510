use super::client::ApiClient;
use super::error::{ApiError, Result};
use super::types::{
    AnalyzeRequest, AnalyzeResponse, DocumentRequest, DocumentResponse, HealthResponse,
    ProvidersResponse, ReviewsListResponse,
};

/// Backend page size ceiling (`limit` is validated as `1..=100` server side).
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Parameters of `GET /api/reviews`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReviewsQuery {
    pub page: u32,
    pub limit: u32,
    pub language: Option<String>,
}

impl ReviewsQuery {
    pub fn new(page: u32, limit: u32, language: Option<&str>) -> Self {
        Self {
            page,
            limit,
            language: language
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(ApiError::Validation("page must be at least 1".to_string()));
        }
        if self.limit < 1 {
            return Err(ApiError::Validation("limit must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Query string pairs; `language` only when set and non-empty.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if let Some(language) = self.language.as_deref().filter(|l| !l.is_empty()) {
            pairs.push(("language", language.to_string()));
        }
        pairs
    }
}

/// Reject blank code before it reaches the network.
pub fn validate_code(code: &str) -> Result<()> {
    if code.trim().is_empty() {
        return Err(ApiError::Validation("Please enter some code".to_string()));
    }
    Ok(())
}

fn review_path(review_id: &str) -> Result<String> {
    let id = review_id.trim();
    if id.is_empty() {
        return Err(ApiError::Validation("review id is empty".to_string()));
    }
    let mut url = url::Url::parse("http://placeholder/api/reviews/")
        .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidUrl("cannot build review path".to_string()))?
        .pop_if_empty()
        .push(id);
    Ok(url.path().to_string())
}

impl ApiClient {
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse> {
        validate_code(&request.code)?;
        self.post("/api/analyze", request).await
    }

    pub async fn document(&self, request: &DocumentRequest) -> Result<DocumentResponse> {
        validate_code(&request.code)?;
        self.post("/api/document", request).await
    }

    pub async fn list_reviews(&self, query: &ReviewsQuery) -> Result<ReviewsListResponse> {
        query.validate()?;
        self.get("/api/reviews", &query.to_pairs()).await
    }

    pub async fn get_review(&self, review_id: &str) -> Result<AnalyzeResponse> {
        let path = review_path(review_id)?;
        self.get(&path, &[]).await
    }

    pub async fn delete_review(&self, review_id: &str) -> Result<()> {
        let path = review_path(review_id)?;
        // The backend answers 204; any JSON body it might add is ignored.
        let _: serde_json::Value = self.delete(&path).await?;
        Ok(())
    }

    pub async fn list_providers(&self) -> Result<ProvidersResponse> {
        self.get("/api/config/llm-providers", &[]).await
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.get("/api/health", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reviews_query_pairs_without_language() {
        let q = ReviewsQuery::new(1, 10, None);
        assert_eq!(
            q.to_pairs(),
            vec![("page", "1".to_string()), ("limit", "10".to_string())]
        );
    }

    #[test]
    fn test_reviews_query_empty_language_is_dropped() {
        let q = ReviewsQuery::new(2, 10, Some("  "));
        assert_eq!(q.language, None);
        assert_eq!(q.to_pairs().len(), 2);
    }

    #[test]
    fn test_reviews_query_with_language() {
        let q = ReviewsQuery::new(2, 10, Some("go"));
        assert_eq!(q.to_pairs()[2], ("language", "go".to_string()));
    }

    #[test]
    fn test_reviews_query_validation() {
        assert!(ReviewsQuery::new(0, 10, None).validate().is_err());
        assert!(ReviewsQuery::new(1, 0, None).validate().is_err());
        assert!(ReviewsQuery::new(1, 1, None).validate().is_ok());
    }

    #[test]
    fn test_validate_code() {
        assert!(matches!(validate_code(""), Err(ApiError::Validation(_))));
        assert!(matches!(validate_code(" \n\t "), Err(ApiError::Validation(_))));
        assert!(validate_code("x = 1").is_ok());
    }

    #[test]
    fn test_review_path_encodes_id() {
        assert_eq!(review_path("abc-123").unwrap(), "/api/reviews/abc-123");
        assert_eq!(review_path("a/b c").unwrap(), "/api/reviews/a%2Fb%20c");
        assert!(review_path(" ").is_err());
    }
}
