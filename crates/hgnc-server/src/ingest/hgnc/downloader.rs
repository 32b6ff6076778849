// HGNC Downloader (local file, HTTP and FTP)

use flate2::read::GzDecoder;
use reqwest::Client;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use suppaftp::{FtpStream, Mode};
use tracing::info;

use super::{ImportConfig, ImportError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Fetches the HGNC document and the HCOP table
pub struct HgncDownloader {
    client: Client,
    config: ImportConfig,
}

impl HgncDownloader {
    pub fn new(config: ImportConfig) -> Result<Self> {
        config.validate().map_err(ImportError::Validation)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("hgnc-server/0.1")
            .build()?;

        Ok(Self { client, config })
    }

    /// Raw bytes of the HGNC JSON document, decompressed if gzipped
    pub async fn fetch_hgnc_json(&self) -> Result<Vec<u8>> {
        let bytes = match self.config.hgnc_json_path {
            Some(ref path) => read_local(path).await?,
            None => self.download(&self.config.hgnc_json_url).await?,
        };
        info!(
            "Fetched HGNC document from {}: {} KB",
            self.config.hgnc_source(),
            bytes.len() / 1024
        );
        decompress_if_gzipped(bytes)
    }

    /// Raw bytes of the HCOP TSV, decompressed if gzipped
    pub async fn fetch_hcop(&self) -> Result<Vec<u8>> {
        let bytes = match self.config.hcop_path {
            Some(ref path) => read_local(path).await?,
            None => self.download(&self.config.hcop_url).await?,
        };
        info!(
            "Fetched HCOP table from {}: {} KB",
            self.config.hcop_source(),
            bytes.len() / 1024
        );
        decompress_if_gzipped(bytes)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        if url.starts_with("ftp://") {
            self.download_ftp(url).await
        } else {
            self.download_url(url).await
        }
    }

    async fn download_url(&self, url: &str) -> Result<Vec<u8>> {
        info!("Downloading {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Download from FTP server
    async fn download_ftp(&self, url: &str) -> Result<Vec<u8>> {
        let (server, path) = split_ftp_url(url)?;
        info!("Connecting to FTP server: {}", server);

        tokio::task::spawn_blocking(move || {
            let mut ftp_stream = FtpStream::connect(format!("{}:21", server))
                .map_err(|e| ImportError::Ftp(e.to_string()))?;

            ftp_stream
                .login("anonymous", "anonymous@")
                .map_err(|e| ImportError::Ftp(e.to_string()))?;

            ftp_stream.set_mode(Mode::Passive);

            info!("Downloading file: {}", path);
            let cursor = ftp_stream
                .retr_as_buffer(&path)
                .map_err(|e| ImportError::Ftp(e.to_string()))?;

            ftp_stream.quit().map_err(|e| ImportError::Ftp(e.to_string()))?;

            Ok(cursor.into_inner())
        })
        .await
        .map_err(|e| ImportError::Ftp(e.to_string()))?
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }
}

async fn read_local(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        ImportError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read '{}': {}", path.display(), e),
        ))
    })
}

/// `ftp://host/path/file` -> (`host`, `/path/file`)
fn split_ftp_url(url: &str) -> Result<(String, String)> {
    let rest = url
        .strip_prefix("ftp://")
        .ok_or_else(|| ImportError::Ftp(format!("Invalid FTP URL: {}", url)))?;

    match rest.split_once('/') {
        Some((server, path)) if !server.is_empty() && !path.is_empty() => {
            Ok((server.to_string(), format!("/{}", path)))
        },
        _ => Err(ImportError::Ftp(format!("FTP URL has no file path: {}", url))),
    }
}

fn decompress_if_gzipped(bytes: Vec<u8>) -> Result<Vec<u8>> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(bytes);
    }

    let mut decoder = GzDecoder::new(bytes.as_slice());
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_downloader_creation() {
        assert!(HgncDownloader::new(ImportConfig::default()).is_ok());

        let config = ImportConfig::builder().timeout_secs(0).build();
        assert!(matches!(
            HgncDownloader::new(config),
            Err(ImportError::Validation(_))
        ));
    }

    #[test]
    fn test_split_ftp_url() {
        let (server, path) =
            split_ftp_url("ftp://ftp.ebi.ac.uk/pub/databases/genenames/hcop/x.txt.gz").unwrap();
        assert_eq!(server, "ftp.ebi.ac.uk");
        assert_eq!(path, "/pub/databases/genenames/hcop/x.txt.gz");

        assert!(split_ftp_url("ftp://ftp.ebi.ac.uk").is_err());
        assert!(split_ftp_url("https://ftp.ebi.ac.uk/x").is_err());
    }

    #[test]
    fn test_decompress_only_gzip() {
        let plain = b"hgnc_id\tortholog_species\n".to_vec();
        assert_eq!(decompress_if_gzipped(plain.clone()).unwrap(), plain);
        assert_eq!(decompress_if_gzipped(gzip(&plain)).unwrap(), plain);
    }

    #[tokio::test]
    async fn test_local_path_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("hcop.txt.gz");
        std::fs::write(&file, gzip(b"hgnc_id\nHGNC:5\n")).unwrap();

        let config = ImportConfig::builder()
            .hcop_url("http://127.0.0.1:1/unreachable")
            .hcop_path(&file)
            .build();
        let bytes = HgncDownloader::new(config).unwrap().fetch_hcop().await.unwrap();
        assert_eq!(bytes, b"hgnc_id\nHGNC:5\n");
    }

    #[tokio::test]
    async fn test_missing_local_file() {
        let config = ImportConfig::builder()
            .hgnc_json_path("/nonexistent/hgnc_complete_set.json")
            .build();
        let err = HgncDownloader::new(config).unwrap().fetch_hgnc_json().await.unwrap_err();
        assert!(matches!(err, ImportError::Io(_)));
    }

    #[tokio::test]
    async fn test_http_download() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hgnc_complete_set.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"response":{"docs":[]}}"#))
            .mount(&server)
            .await;

        let config = ImportConfig::builder()
            .hgnc_json_url(format!("{}/hgnc_complete_set.json", server.uri()))
            .build();
        let bytes = HgncDownloader::new(config).unwrap().fetch_hgnc_json().await.unwrap();
        assert_eq!(bytes, br#"{"response":{"docs":[]}}"#);
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let config = ImportConfig::builder()
            .hcop_url(format!("{}/missing.txt.gz", server.uri()))
            .build();
        let err = HgncDownloader::new(config).unwrap().fetch_hcop().await.unwrap_err();
        assert!(err.is_download_error());
    }
}
