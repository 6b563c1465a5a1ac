// Re-export the proto module from the shared `api-shared` crate so callers
// can continue to reference `api_grpc::service::pb`.
pub use api_shared::pb;

use api_shared::pb::llamaid_server::Llamaid;
use api_shared::{auth, convert, HealthService};
use llamaid_assistant::Assistant;
use llamaid_core::TextEngine;
use llamaid_types::PromptText;
use std::sync::Arc;
use tonic::{Request, Response, Status};

/// Build an interceptor that checks the `x-api-key` header against `expected`.
pub fn auth_interceptor(
    expected: Option<String>,
) -> impl FnMut(Request<()>) -> Result<Request<()>, Status> + Clone {
    let expected: Option<Arc<str>> = expected.map(Arc::from);
    move |req: Request<()>| {
        let api_key = req
            .metadata()
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Status::unauthenticated("Missing x-api-key header"))?;

        auth::validate_api_key(api_key, expected.as_deref())?;
        Ok(req)
    }
}

#[derive(Clone)]
pub struct LlamaidService {
    engine: Arc<TextEngine>,
    assistant: Arc<dyn Assistant>,
}

impl LlamaidService {
    pub fn new(engine: Arc<TextEngine>, assistant: Arc<dyn Assistant>) -> Self {
        Self { engine, assistant }
    }
}

#[tonic::async_trait]
impl Llamaid for LlamaidService {
    async fn health(&self, _req: Request<()>) -> Result<Response<pb::HealthRes>, Status> {
        Ok(Response::new(HealthService::check_health()))
    }

    async fn annotate(
        &self,
        req: Request<pb::AnnotateReq>,
    ) -> Result<Response<pb::AnnotateRes>, Status> {
        let req = req.into_inner();
        let lines = self.engine.annotate(&req.text);
        Ok(Response::new(convert::annotate_res(&lines)))
    }

    async fn classify(
        &self,
        req: Request<pb::ClassifyReq>,
    ) -> Result<Response<pb::ClassifyRes>, Status> {
        let req = req.into_inner();
        let (scenario, summary) = self.engine.classify(&req.text);
        Ok(Response::new(convert::classify_res(scenario, summary)))
    }

    async fn export_sbar(
        &self,
        req: Request<pb::ClassifyReq>,
    ) -> Result<Response<pb::ExportSbarRes>, Status> {
        let req = req.into_inner();
        Ok(Response::new(pb::ExportSbarRes {
            text: self.engine.export_summary(&req.text),
        }))
    }

    async fn ask(&self, req: Request<pb::AskReq>) -> Result<Response<pb::AskRes>, Status> {
        let req = req.into_inner();
        let prompt = PromptText::new(&req.prompt)
            .map_err(|e| Status::invalid_argument(e.to_string()))?;

        match self.assistant.ask(&prompt).await {
            Ok(response) => Ok(Response::new(pb::AskRes { response })),
            Err(e) => {
                tracing::error!("assistant error: {:?}", e);
                Err(Status::unavailable("Upstream assistant unavailable"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llamaid_assistant::AssistantError;

    struct Echo;

    #[async_trait::async_trait]
    impl Assistant for Echo {
        async fn ask(&self, prompt: &PromptText) -> Result<String, AssistantError> {
            Ok(format!("echo: {prompt}"))
        }
    }

    struct Down;

    #[async_trait::async_trait]
    impl Assistant for Down {
        async fn ask(&self, _prompt: &PromptText) -> Result<String, AssistantError> {
            Err(AssistantError::EmptyResponse)
        }
    }

    fn service(assistant: Arc<dyn Assistant>) -> LlamaidService {
        LlamaidService::new(Arc::new(TextEngine::default()), assistant)
    }

    #[tokio::test]
    async fn classify_returns_scenario_and_summary() {
        let res = service(Arc::new(Echo))
            .classify(Request::new(pb::ClassifyReq {
                text: "Perform CPR for infant.\nCheck airway.".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(res.scenario, "resuscitation");
        assert_eq!(res.summary.unwrap().recommendation, "Check airway.");
    }

    #[tokio::test]
    async fn annotate_tags_keywords() {
        let res = service(Arc::new(Echo))
            .annotate(Request::new(pb::AnnotateReq {
                text: "monitor vitals".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(res.lines[0].segments[0].category, "caution");
    }

    #[tokio::test]
    async fn export_uses_section_headers() {
        let res = service(Arc::new(Echo))
            .export_sbar(Request::new(pb::ClassifyReq { text: "".into() }))
            .await
            .unwrap()
            .into_inner();
        assert!(res.text.starts_with("SITUATION:\n"));
    }

    #[tokio::test]
    async fn ask_rejects_blank_prompt() {
        let status = service(Arc::new(Echo))
            .ask(Request::new(pb::AskReq { prompt: "  ".into() }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn ask_forwards_to_assistant() {
        let res = service(Arc::new(Echo))
            .ask(Request::new(pb::AskReq {
                prompt: "Chest pain".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(res.response, "echo: Chest pain");
    }

    #[tokio::test]
    async fn ask_maps_upstream_failure_to_unavailable() {
        let status = service(Arc::new(Down))
            .ask(Request::new(pb::AskReq {
                prompt: "Chest pain".into(),
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unavailable);
    }

    #[test]
    fn interceptor_checks_api_key() {
        let mut intercept = auth_interceptor(Some("secret".into()));

        let mut ok = Request::new(());
        ok.metadata_mut()
            .insert("x-api-key", "secret".parse().unwrap());
        assert!(intercept(ok).is_ok());

        let missing = Request::new(());
        assert_eq!(
            intercept(missing).unwrap_err().code(),
            tonic::Code::Unauthenticated
        );
    }
}
