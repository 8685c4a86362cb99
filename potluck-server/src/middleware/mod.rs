pub mod auth;

use potluck_common::token::TokenError;

use actix_web::http::header;
use actix_web::HttpRequest;

/// Pulls the token out of an `Authorization: Bearer <token>` header. The
/// scheme is matched case-insensitively.
fn get_bearer_token(req: &HttpRequest) -> Result<&str, TokenError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(TokenError::TokenMissing)?;

    let header = header.to_str().map_err(|_| TokenError::TokenInvalid)?;
    let (scheme, token) = header.split_once(' ').ok_or(TokenError::TokenInvalid)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(TokenError::TokenInvalid);
    }

    let token = token.trim();

    if token.is_empty() {
        return Err(TokenError::TokenMissing);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::test::TestRequest;

    #[test]
    fn test_get_bearer_token() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc.def"))
            .to_http_request();
        assert_eq!(get_bearer_token(&req), Ok("abc.def"));

        let req = TestRequest::default()
            .insert_header(("Authorization", "bearer  abc"))
            .to_http_request();
        assert_eq!(get_bearer_token(&req), Ok("abc"));
    }

    #[test]
    fn test_get_bearer_token_failures() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(get_bearer_token(&req), Err(TokenError::TokenMissing));

        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer "))
            .to_http_request();
        assert_eq!(get_bearer_token(&req), Err(TokenError::TokenMissing));

        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert_eq!(get_bearer_token(&req), Err(TokenError::TokenInvalid));

        let req = TestRequest::default()
            .insert_header(("Authorization", "abc"))
            .to_http_request();
        assert_eq!(get_bearer_token(&req), Err(TokenError::TokenInvalid));
    }
}
