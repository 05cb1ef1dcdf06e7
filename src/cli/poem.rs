use anyhow::Result;

use crate::client::ProxyClient;
use crate::core::AppConfig;
use crate::poetry::PoetryStyle;

pub async fn run(topic: &str, style: PoetryStyle) -> Result<()> {
    let AppConfig {
        service_url,
        public_key,
        ..
    } = AppConfig::default();
    let client = ProxyClient::new(&service_url, &public_key);
    let poetry = client.generate_poetry(topic, style).await?;
    println!("{}", poetry);
    Ok(())
}
