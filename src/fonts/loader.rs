//! Fetching of the font resource, over HTTP or from the disk.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::fonts::{FontLoadError, FontRepository};

/// The font used when none is configured.
pub const FONT_URL: &str =
    "https://raw.githubusercontent.com/anthraxora-ui/svgfont/main/vertopal.com_QEKunjarScript.svg";

/// How long to wait for the math renderer before fetching the font anyway.
pub const READINESS_GRACE: Duration = Duration::from_millis(500);

/// Something that can give the bytes of a font document.
#[allow(async_fn_in_trait)]
pub trait FontSource {
    /// Fetches the whole font document.
    async fn fetch(&self) -> Result<Vec<u8>, FontLoadError>;
}

/// A font served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    /// The url of the font document.
    pub url: String,
}

impl HttpSource {
    /// Creates a source for an url.
    pub fn new<S: Into<String>>(url: S) -> HttpSource {
        HttpSource { url: url.into() }
    }
}

impl Default for HttpSource {
    fn default() -> HttpSource {
        HttpSource::new(FONT_URL)
    }
}

impl FontSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<u8>, FontLoadError> {
        debug!("fetching font from {}", self.url);

        let response = reqwest::get(&self.url)
            .await
            .map_err(|e| FontLoadError::FetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FontLoadError::FetchFailed(format!("HTTP {}", status.as_u16())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FontLoadError::FetchFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

/// A font stored in a local file.
#[derive(Debug, Clone)]
pub struct FileSource {
    /// The path to the font document.
    pub path: PathBuf,
}

impl FontSource for FileSource {
    async fn fetch(&self) -> Result<Vec<u8>, FontLoadError> {
        debug!("reading font from {}", self.path.display());

        tokio::fs::read(&self.path)
            .await
            .map_err(|e| FontLoadError::FetchFailed(format!("{}: {}", self.path.display(), e)))
    }
}

/// The sources a font can be configured from.
#[derive(Debug, Clone)]
pub enum Source {
    /// A font served over HTTP.
    Http(HttpSource),

    /// A font stored on the disk.
    File(FileSource),
}

impl FontSource for Source {
    async fn fetch(&self) -> Result<Vec<u8>, FontLoadError> {
        match self {
            Source::Http(source) => source.fetch().await,
            Source::File(source) => source.fetch().await,
        }
    }
}

/// Where the loading of the font stands, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontStatus {
    /// The font is being fetched.
    Loading,

    /// The font is usable.
    Ready {
        /// The family of the font.
        family: String,

        /// How many glyphs it has.
        glyphs: usize,
    },

    /// The font could not be loaded; text will not be drawn.
    Failed(String),
}

impl FontStatus {
    /// Returns true if the font is usable.
    pub fn is_ready(&self) -> bool {
        matches!(self, FontStatus::Ready { .. })
    }
}

impl fmt::Display for FontStatus {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FontStatus::Loading => write!(fmt, "Loading font..."),
            FontStatus::Ready { family, glyphs } => {
                write!(fmt, "{} ready ({} glyphs)", family, glyphs)
            }
            FontStatus::Failed(message) => write!(fmt, "{}", message),
        }
    }
}

/// Fetches and parses the font.
///
/// If the math renderer is not ready yet, it is given a short grace period first, so that both
/// become available at about the same time. A failure gives no font and a failed status; the
/// document can still be laid out, only without text.
pub async fn load_font<S: FontSource>(
    source: &S,
    math_ready: bool,
) -> (Option<FontRepository>, FontStatus) {
    if !math_ready {
        tokio::time::sleep(READINESS_GRACE).await;
    }

    let font = match source.fetch().await {
        Ok(bytes) => FontRepository::load(&bytes),
        Err(e) => Err(e),
    };

    match font {
        Ok(font) => {
            let status = FontStatus::Ready {
                family: font.metrics().family.clone(),
                glyphs: font.len(),
            };
            info!("{}", status);
            (Some(font), status)
        }
        Err(e) => {
            error!("cannot load font: {}", e);
            (None, FontStatus::Failed(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::{load_font, FileSource, FontSource, FontStatus, HttpSource, READINESS_GRACE};
    use crate::fonts::FontLoadError;
    use crate::testing::SAMPLE_FONT;

    struct Static(Result<Vec<u8>, FontLoadError>);

    impl FontSource for Static {
        async fn fetch(&self) -> Result<Vec<u8>, FontLoadError> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn ready_status() {
        let source = Static(Ok(SAMPLE_FONT.as_bytes().to_vec()));
        let (font, status) = load_font(&source, true).await;
        assert!(font.is_some());
        assert_eq!(status.to_string(), "Sample ready (4 glyphs)");
        assert!(status.is_ready());
    }

    #[tokio::test]
    async fn http_failure() {
        let source = Static(Err(FontLoadError::FetchFailed(String::from("HTTP 404"))));
        let (font, status) = load_font(&source, true).await;
        assert!(font.is_none());
        assert_eq!(status, FontStatus::Failed(String::from("HTTP 404")));
    }

    #[tokio::test]
    async fn http_not_found() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = [0; 1024];
            let _ = stream.read(&mut request).await.unwrap();
            let response = "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";
            stream.write_all(response.as_bytes()).await.unwrap();
        });

        let source = HttpSource::new(format!("http://{}/font.svg", address));
        let (font, status) = load_font(&source, true).await;
        assert!(font.is_none());
        assert_eq!(status, FontStatus::Failed(String::from("HTTP 404")));
    }

    #[tokio::test]
    async fn malformed_font() {
        let source = Static(Ok(b"<svg><g/></svg>".to_vec()));
        let (font, status) = load_font(&source, true).await;
        assert!(font.is_none());
        assert_eq!(status.to_string(), "no <font> element found");
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_math() {
        let source = Static(Ok(SAMPLE_FONT.as_bytes().to_vec()));
        let start = tokio::time::Instant::now();
        load_font(&source, false).await;
        assert!(start.elapsed() >= READINESS_GRACE);

        let start = tokio::time::Instant::now();
        load_font(&source, true).await;
        assert!(start.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test]
    async fn from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_FONT.as_bytes()).unwrap();

        let source = FileSource {
            path: file.path().to_path_buf(),
        };
        let (font, _) = load_font(&source, true).await;
        assert_eq!(font.unwrap().len(), 4);

        let missing = FileSource {
            path: PathBuf::from("/definitely/not/here.svg"),
        };
        assert!(matches!(
            missing.fetch().await,
            Err(FontLoadError::FetchFailed(_))
        ));
    }

    #[test]
    fn status_display() {
        assert_eq!(FontStatus::Loading.to_string(), "Loading font...");
    }
}
