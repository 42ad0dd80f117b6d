// KustoClient and the Entra ID credentials against in-process stand-ins.

mod test_utils;

use axum::{
    Form, Json, Router,
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use kustonl_core::ClusterConfig;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use kustonl_kusto::{
    AuthSecrets, ClientCertificateCredential, ClientSecretCredential, KustoClient, KustoConnector,
    KustoErrorKind, QueryClient, QueryExecutor, Secret, TokenCredential,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use test_utils::{StaticCredential, as_json};

const APP_PRIVATE_KEY: &str = include_str!("fixtures/app.key");
const APP_PUBLIC_KEY: &str = include_str!("fixtures/app.pub.pem");
const APP_CERTIFICATE: &str = include_str!("fixtures/app.crt");
const APP_THUMBPRINT: &str = "3C:8E:34:F2:38:9B:F5:7F:93:01:78:F6:D3:BC:A7:21:83:4F:F4:8E";
// base64url of the thumbprint bytes
const APP_X5T: &str = "PI408jib9X-TAXj207ynIYNP9I4";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

async fn rest_query(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let authorized =
        authorization == "Bearer test-token" || authorization.starts_with("Bearer token-for-");
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"code": "Unauthorized", "message": "Unauthorized"}})),
        );
    }
    let request_id = headers
        .get("x-ms-client-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !request_id.starts_with("KNL.execute;") {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": {"message": "no request id"}})));
    }

    if body["csl"] == "NoSuchTable" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {
                "code": "General_BadRequest",
                "message": "Request is invalid and cannot be executed.",
                "@message": "'NoSuchTable' could not be resolved"
            }})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "Tables": [{
                "TableName": "Table_0",
                "Columns": [
                    {"ColumnName": "db", "DataType": "String", "ColumnType": "string"},
                    {"ColumnName": "rows", "DataType": "Int64", "ColumnType": "long"}
                ],
                "Rows": [[body["db"], 2]]
            }]
        })),
    )
}

// Some(true) for a valid assertion carrying the certificate chain,
// Some(false) for a valid one without it.
fn verify_assertion(assertion: &str) -> Option<bool> {
    let header = jsonwebtoken::decode_header(assertion).ok()?;
    if header.alg != Algorithm::RS256 || header.x5t.as_deref() != Some(APP_X5T) {
        return None;
    }

    let key = DecodingKey::from_rsa_pem(APP_PUBLIC_KEY.as_bytes()).ok()?;
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_aud = false;
    let claims = jsonwebtoken::decode::<Value>(assertion, &key, &validation)
        .ok()?
        .claims;
    let audience_ok = claims["aud"]
        .as_str()
        .is_some_and(|aud| aud.ends_with("/contoso/oauth2/v2.0/token"));
    if !audience_ok || claims["iss"] != "app" || claims["sub"] != "app" {
        return None;
    }

    match header.x5c {
        None => Some(false),
        Some(chain) => {
            let der: String = APP_CERTIFICATE
                .lines()
                .filter(|line| !line.starts_with("-----"))
                .collect();
            (chain == vec![der]).then_some(true)
        }
    }
}

async fn token(Path(tenant): Path<String>, Form(form): Form<HashMap<String, String>>) -> impl IntoResponse {
    let field = |name: &str| form.get(name).map(String::as_str);
    let signed_in = match field("client_assertion") {
        Some(assertion) => {
            let typed = field("client_assertion_type")
                == Some("urn:ietf:params:oauth:client-assertion-type:jwt-bearer");
            verify_assertion(assertion)
                .filter(|_| typed)
                .map(|sni| if sni { "#sni" } else { "" })
        }
        None => (field("client_secret") == Some("s3cret")).then_some(""),
    };
    let valid = tenant == "contoso"
        && field("grant_type") == Some("client_credentials")
        && field("client_id") == Some("app");

    match signed_in.filter(|_| valid) {
        Some(suffix) => (
            StatusCode::OK,
            Json(json!({
                "token_type": "Bearer",
                "expires_in": 3599,
                "access_token": format!("token-for-{}{}", form["scope"], suffix)
            })),
        ),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid_client"})),
        ),
    }
}

async fn spawn_cluster() -> anyhow::Result<String> {
    let app = Router::new()
        .route("/v1/rest/query", post(rest_query))
        .route("/:tenant/oauth2/v2.0/token", post(token));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn test_query_round_trip() -> anyhow::Result<()> {
    let cluster = spawn_cluster().await?;
    let client = KustoClient::new(
        format!("{cluster}/"),
        reqwest::Client::new(),
        Arc::new(StaticCredential("test-token")),
    );
    assert_eq!(client.cluster_uri(), cluster);

    let response = client.execute("Telemetry", "T | count").await?;
    let rows = response.into_primary_result().unwrap().into_rows();
    assert_eq!(as_json(&rows), json!([{"db": "Telemetry", "rows": 2}]));
    Ok(())
}

#[tokio::test]
async fn test_service_error_message_is_surfaced() -> anyhow::Result<()> {
    let cluster = spawn_cluster().await?;
    let client = KustoClient::new(
        cluster,
        reqwest::Client::new(),
        Arc::new(StaticCredential("test-token")),
    );

    let err = client.execute("Telemetry", "NoSuchTable").await.unwrap_err();
    assert_eq!(
        err.kind,
        KustoErrorKind::Query {
            status: 400,
            message: "'NoSuchTable' could not be resolved".to_string()
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_rejected_token() -> anyhow::Result<()> {
    let cluster = spawn_cluster().await?;
    let client = KustoClient::new(
        cluster,
        reqwest::Client::new(),
        Arc::new(StaticCredential("wrong")),
    );

    let err = client.execute("Telemetry", "T").await.unwrap_err();
    assert!(matches!(err.kind, KustoErrorKind::Query { status: 401, .. }));
    Ok(())
}

#[tokio::test]
async fn test_client_secret_credential() -> anyhow::Result<()> {
    let authority = spawn_cluster().await?;
    let credential = ClientSecretCredential::new(
        reqwest::Client::new(),
        authority.clone(),
        "contoso",
        "app",
        Secret::new("s3cret"),
    );

    let token = credential
        .get_token("https://mycluster.kusto.windows.net/")
        .await?;
    assert_eq!(
        token.token.expose(),
        "token-for-https://mycluster.kusto.windows.net/.default"
    );
    assert!(token.expires_on.is_some());

    let wrong = ClientSecretCredential::new(
        reqwest::Client::new(),
        authority,
        "contoso",
        "app",
        Secret::new("nope"),
    );
    let err = wrong.get_token("https://c").await.unwrap_err();
    assert!(matches!(err.kind, KustoErrorKind::Credential(_)));
    Ok(())
}

#[tokio::test]
async fn test_executor_with_overridden_credential() -> anyhow::Result<()> {
    let cluster = spawn_cluster().await?;
    let connector = KustoConnector::new().with_credential(Arc::new(StaticCredential("test-token")));
    let executor = QueryExecutor::new(
        ClusterConfig::new(cluster, "Telemetry", "UserPrompt"),
        AuthSecrets::default(),
        Arc::new(connector),
    );

    let rows = executor.execute("T | count").await?;
    assert_eq!(as_json(&rows), json!([{"db": "Telemetry", "rows": 2}]));
    Ok(())
}

#[tokio::test]
async fn test_app_key_signs_in_through_authority() -> anyhow::Result<()> {
    let server = spawn_cluster().await?;
    let secrets = AuthSecrets {
        app_id: Some("app".to_string()),
        app_key: Some(Secret::new("s3cret")),
        app_tenant: Some("contoso".to_string()),
        ..Default::default()
    };
    let executor = QueryExecutor::new(
        ClusterConfig::new(server.clone(), "Telemetry", "AppKey"),
        secrets,
        Arc::new(KustoConnector::new().with_authority_host(server)),
    );

    let rows = executor.execute("T").await?;
    assert_eq!(as_json(&rows), json!([{"db": "Telemetry", "rows": 2}]));
    Ok(())
}

#[tokio::test]
async fn test_client_certificate_credential() -> anyhow::Result<()> {
    let authority = spawn_cluster().await?;
    let credential = ClientCertificateCredential::new(
        reqwest::Client::new(),
        authority.clone(),
        "contoso",
        "app",
        Secret::new(APP_PRIVATE_KEY),
        APP_THUMBPRINT,
    );

    let token = credential
        .get_token("https://mycluster.kusto.windows.net")
        .await?;
    assert_eq!(
        token.token.expose(),
        "token-for-https://mycluster.kusto.windows.net/.default"
    );

    let sni = credential.clone().with_public_certificate(APP_CERTIFICATE);
    let token = sni.get_token("https://mycluster.kusto.windows.net").await?;
    assert_eq!(
        token.token.expose(),
        "token-for-https://mycluster.kusto.windows.net/.default#sni"
    );

    let wrong_thumbprint = ClientCertificateCredential::new(
        reqwest::Client::new(),
        authority,
        "contoso",
        "app",
        Secret::new(APP_PRIVATE_KEY),
        "0000000000000000000000000000000000000000",
    );
    let err = wrong_thumbprint.get_token("https://c").await.unwrap_err();
    assert!(matches!(err.kind, KustoErrorKind::Credential(_)));
    Ok(())
}

#[tokio::test]
async fn test_app_certificate_signs_in_through_authority() -> anyhow::Result<()> {
    let server = spawn_cluster().await?;
    let plain = AuthSecrets {
        app_id: Some("app".to_string()),
        app_tenant: Some("contoso".to_string()),
        cert_thumbprint: Some(APP_THUMBPRINT.to_string()),
        private_key_pem_file_path: Some(fixture("app.key")),
        ..Default::default()
    };
    let with_public_cert = AuthSecrets {
        public_cert_file_path: Some(fixture("app.crt")),
        ..plain.clone()
    };

    for secrets in [plain, with_public_cert] {
        let executor = QueryExecutor::new(
            ClusterConfig::new(server.clone(), "Telemetry", "AppCertificate"),
            secrets,
            Arc::new(KustoConnector::new().with_authority_host(server.clone())),
        );
        let rows = executor.execute("T").await?;
        assert_eq!(as_json(&rows), json!([{"db": "Telemetry", "rows": 2}]));
    }
    Ok(())
}
