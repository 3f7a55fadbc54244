use serde_json::{Map, Value};

use crate::domain::entities::entity::Entity;
use crate::domain::entities::page::{PageRequest, PageResponse};
use crate::usecase::ports::fetcher::{FetchError, FetchRequest};

/// Turns an HTTP status and body into a page of entities.
///
/// Accepted bodies:
/// - `{ "status": 200, "data": [...] }` (whole collection)
/// - `{ "data": [...], "page", "size", "totalElements", "totalPages" }`
/// - `{ "data": { "content": [...], "number", "size", "totalElements", "totalPages" } }`
/// - a bare JSON array
pub fn decode_response(
    status: u16,
    body: &str,
    request: &FetchRequest,
    id_field: &str,
) -> Result<PageResponse, FetchError> {
    if !(200..300).contains(&status) {
        return Err(FetchError::Server {
            status,
            message: server_message(body),
        });
    }

    let value: Value =
        serde_json::from_str(body).map_err(|err| FetchError::Decode(err.to_string()))?;

    if let Some(object) = value.as_object() {
        if let Some(embedded) = object.get("status").and_then(Value::as_u64) {
            if !(200..300).contains(&embedded) {
                return Err(FetchError::Server {
                    status: u16::try_from(embedded).unwrap_or(u16::MAX),
                    message: object
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                });
            }
        }
    }

    let (records, meta) = match &value {
        Value::Array(records) => (records, None),
        Value::Object(object) => match object.get("data") {
            Some(Value::Array(records)) => (records, page_meta(object)),
            Some(Value::Object(page)) => match page.get("content") {
                Some(Value::Array(records)) => (records, page_meta(page)),
                _ => return Err(FetchError::Decode("data object has no content array".into())),
            },
            _ => return Err(FetchError::Decode("response has no data array".into())),
        },
        _ => return Err(FetchError::Decode("response is not an object or array".into())),
    };

    let base = meta.map(|m| m.page_index * m.page_size).unwrap_or(0);
    let entities = records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            Entity::from_json(record, id_field, base + idx)
                .ok_or_else(|| FetchError::Decode(format!("record {} is not an object", base + idx)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(match (meta, request.page) {
        (Some(meta), _) => PageResponse {
            data: entities,
            page_index: meta.page_index,
            page_size: meta.page_size,
            total_elements: meta.total_elements,
            total_pages: meta.total_pages,
        },
        (None, None) => PageResponse::unpaged(entities),
        // Backend ignored paging: cut the requested window ourselves.
        (None, Some(page)) => window(entities, page),
    })
}

#[derive(Debug, Clone, Copy)]
struct PageMeta {
    page_index: usize,
    page_size: usize,
    total_elements: usize,
    total_pages: usize,
}

fn page_meta(object: &Map<String, Value>) -> Option<PageMeta> {
    let read = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| object.get(*key).and_then(Value::as_u64))
            .and_then(|n| usize::try_from(n).ok())
    };
    let total_elements = read(&["totalElements", "total"])?;
    let page_size = read(&["size", "pageSize"]).unwrap_or(total_elements);
    let page_index = read(&["page", "number", "pageIndex"]).unwrap_or(0);
    let total_pages = read(&["totalPages"])
        .unwrap_or_else(|| crate::domain::entities::page::total_pages(total_elements, page_size));
    Some(PageMeta {
        page_index,
        page_size,
        total_elements,
        total_pages,
    })
}

fn window(entities: Vec<Entity>, page: PageRequest) -> PageResponse {
    let total_elements = entities.len();
    let data = entities
        .into_iter()
        .skip(page.page_index * page.page_size)
        .take(page.page_size)
        .collect();
    PageResponse::paged(data, page, total_elements)
}

fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paged_request(page_index: usize, page_size: usize) -> FetchRequest {
        FetchRequest {
            page: Some(PageRequest {
                page_index,
                page_size,
            }),
            ..FetchRequest::default()
        }
    }

    #[test]
    fn decodes_unpaged_envelope() {
        let body = r#"{"status":200,"data":[{"programId":1,"programName":"Welding"},{"programId":2}]}"#;

        let page = decode_response(200, body, &FetchRequest::default(), "programId")
            .expect("body should decode");

        assert_eq!(page.total_elements, 2);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page_size, 2);
        assert_eq!(page.data[0].text("programName"), "Welding");
    }

    #[test]
    fn decodes_paged_envelope() {
        let body = r#"{"data":[{"id":"a"}],"page":3,"size":1,"totalElements":7,"totalPages":7}"#;

        let page = decode_response(200, body, &paged_request(3, 1), "id").expect("should decode");

        assert_eq!(page.page_index, 3);
        assert_eq!(page.total_elements, 7);
        assert_eq!(page.data[0].id.0, "a");
    }

    #[test]
    fn decodes_nested_content_page() {
        let body = r#"{"status":200,"data":{"content":[{"x":1},{"x":2}],"number":1,"size":2,"totalElements":5}}"#;

        let page = decode_response(200, body, &paged_request(1, 2), "id").expect("should decode");

        assert_eq!(page.total_pages, 3);
        assert_eq!(page.data[1].id.0, "#3");
    }

    #[test]
    fn cuts_window_when_backend_ignores_paging() {
        let body = r#"[{"id":1},{"id":2},{"id":3},{"id":4},{"id":5}]"#;

        let page = decode_response(200, body, &paged_request(1, 2), "id").expect("should decode");

        let ids: Vec<&str> = page.data.iter().map(|e| e.id.0.as_str()).collect();
        assert_eq!(ids, vec!["3", "4"]);
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn non_success_status_carries_message() {
        let err = decode_response(
            500,
            r#"{"message":"database down"}"#,
            &FetchRequest::default(),
            "id",
        )
        .expect_err("500 should fail");

        assert_eq!(
            err,
            FetchError::Server {
                status: 500,
                message: Some("database down".into())
            }
        );

        let err = decode_response(502, "<html>", &FetchRequest::default(), "id")
            .expect_err("502 should fail");
        assert_eq!(
            err,
            FetchError::Server {
                status: 502,
                message: None
            }
        );
    }

    #[test]
    fn embedded_error_status_is_a_server_error() {
        let err = decode_response(
            200,
            r#"{"status":404,"message":"no such institution","data":[]}"#,
            &FetchRequest::default(),
            "id",
        )
        .expect_err("embedded 404 should fail");

        assert!(matches!(err, FetchError::Server { status: 404, .. }));
    }

    #[test]
    fn malformed_bodies_are_decode_errors() {
        for body in ["not json", r#"{"status":200}"#, r#"{"data":[1,2]}"#, "42"] {
            let err = decode_response(200, body, &FetchRequest::default(), "id")
                .expect_err("malformed body should fail");
            assert!(matches!(err, FetchError::Decode(_)), "{body}: {err:?}");
        }
    }
}
