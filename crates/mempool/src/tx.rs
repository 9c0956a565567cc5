use super::*;

impl MempoolClient {
    /// Raw hex of a transaction, as needed for legacy input signing.
    pub async fn get_tx_hex(&self, txid: &Txid) -> Result<String> {
        let url = self.url(&format!("tx/{}/hex", txid));
        debug!("{}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        let hex = response.text().await?;
        Ok(hex.trim().to_string())
    }

    /// Pushes a raw transaction; the explorer answers with the txid.
    pub async fn send_tx_hex(&self, tx_hex: &str) -> Result<String> {
        let url = self.url("tx");
        debug!("{}", url);
        let response = self
            .client
            .post(url)
            .header("Content-Type", "text/plain")
            .body(tx_hex.to_string())
            .send()
            .await?;
        let status = response.status();
        let resp = response.text().await?;
        if !status.is_success() {
            return Err(anyhow!("broadcast rejected ({}): {}", status, resp));
        }
        Ok(resp)
    }
}
