use super::*;
use serde_json::json;

#[test]
fn envelope_parses_success_payload() {
    let raw = json!({ "data": { "token": "t", "user": {
        "id": "1", "name": "A", "email": "a@b.c", "role": "admin",
        "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"
    } }, "message": "ok", "success": true });

    let env: ApiResponse<AuthResponse> = serde_json::from_value(raw).unwrap();
    assert!(env.success);
    let data = env.into_success().unwrap();
    assert_eq!(data.token, "t");
    assert_eq!(data.user.avatar, None);
}

#[test]
fn envelope_tolerates_missing_data_and_message() {
    let env: ApiResponse<User> = serde_json::from_value(json!({ "success": false })).unwrap();
    assert_eq!(env.data, None);
    assert_eq!(env.message, "");
    assert_eq!(env.message_or("fallback"), "fallback");
}

#[test]
fn envelope_null_data_is_none() {
    let env: ApiResponse<User> = serde_json::from_value(json!({ "data": null, "success": true })).unwrap();
    assert_eq!(env.into_success(), None);
}

#[test]
fn into_success_ignores_data_when_not_successful() {
    let env = ApiResponse { data: Some(5), message: "nope".to_owned(), success: false };
    assert_eq!(env.message_or("fallback"), "nope");
    assert_eq!(env.into_success(), None);
}

#[test]
fn paginated_envelope_reads_pagination_block() {
    let raw = json!({
        "data": [1, 2, 3],
        "message": "",
        "success": true,
        "pagination": { "page": 2, "limit": 3, "total": 9, "totalPages": 3 }
    });
    let page: PaginatedResponse<u32> = serde_json::from_value(raw).unwrap();
    assert_eq!(page.data, vec![1, 2, 3]);
    assert_eq!(page.pagination, Pagination { page: 2, limit: 3, total: 9, total_pages: 3 });
}

#[test]
fn register_data_serializes_camel_case() {
    let data = RegisterData {
        name: "N".to_owned(),
        email: "n@e.x".to_owned(),
        password: "p".to_owned(),
        confirm_password: "p".to_owned(),
    };
    let value = serde_json::to_value(&data).unwrap();
    assert_eq!(value["confirmPassword"], "p");
}

#[test]
fn user_avatar_omitted_when_absent() {
    let user = User {
        id: "1".to_owned(),
        name: "A".to_owned(),
        email: "a@b.c".to_owned(),
        role: "admin".to_owned(),
        avatar: None,
        created_at: "x".to_owned(),
        updated_at: "y".to_owned(),
    };
    let value = serde_json::to_value(&user).unwrap();
    assert!(value.get("avatar").is_none());
    assert_eq!(value["updatedAt"], "y");
}
