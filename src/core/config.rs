use std::env;

pub const DEFAULT_SYSTEM_MESSAGE: &str = "أنت مساعد ذكي مفيد ولطيف، صممك وطورك المبرمج أحمد. تجيب على الأسئلة بالعربية بشكل واضح ومفصل. يمكنك تحليل الصور والإجابة على الأسئلة المتعلقة بها. عندما يسألك أحد من صنعك أو من طورك، أجب بأن صانعك هو المبرمج أحمد.";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    // Upstream model gateway, used by the proxy endpoints
    pub gateway_api_hostname: String,
    pub gateway_api_key: Option<String>,
    pub gateway_model: String,
    pub system_message: String,
    // Proxy endpoints as seen by the chat and poetry clients
    pub service_url: String,
    pub public_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let host = "127.0.0.1";
        let port = "2222";
        let storage_path = env::var("QALAM_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/qalam.db", storage_path.trim_end_matches('/'));
        let gateway_api_hostname = env::var("QALAM_GATEWAY_URL")
            .unwrap_or_else(|_| "https://ai.gateway.lovable.dev".to_string());
        // Only the proxy needs the secret so a missing key is reported
        // when a request actually reaches the gateway
        let gateway_api_key = env::var("QALAM_GATEWAY_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let gateway_model =
            env::var("QALAM_MODEL").unwrap_or_else(|_| "google/gemini-2.5-flash".to_string());
        let system_message = env::var("QALAM_SYSTEM_MESSAGE")
            .unwrap_or_else(|_| DEFAULT_SYSTEM_MESSAGE.to_string());
        let service_url =
            env::var("QALAM_SERVICE_URL").unwrap_or(format!("http://{}:{}", host, port));
        let public_key = env::var("QALAM_PUBLIC_KEY").unwrap_or_default();

        Self {
            storage_path,
            db_path,
            gateway_api_hostname,
            gateway_api_key,
            gateway_model,
            system_message,
            service_url,
            public_key,
        }
    }
}
