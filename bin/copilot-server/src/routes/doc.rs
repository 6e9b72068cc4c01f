use crate::routes::{health, v1};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "copilot-server",
    description = "VSDP Living Intelligence Copilot API",
    version = "0.1.0",
    contact(name = "vsdp-copilot", url = "https://github.com/vision-source/vsdp-copilot")
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::api_docs());
    root.merge(v1::api_docs());
    root
}
