use async_trait::async_trait;
use vidtok_streamer::downloader::extractors::{ExtractorConfig, InfoExtractor};
use vidtok_streamer::downloader::transfer::StreamFetcher;
use vidtok_streamer::downloader::{
    DownloadProgress, ErrorKind, StreamError, StreamFormat, Streamer, VideoInfo,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BODY: &[u8] = b"not really an mp4 but close enough";

/// Extractor that hands back a fixed result
struct StaticExtractor {
    result: Result<VideoInfo, String>,
}

#[async_trait]
impl InfoExtractor for StaticExtractor {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn is_available(&self, _config: &ExtractorConfig) -> bool {
        true
    }

    async fn extract(&self, _url: &str, _config: &ExtractorConfig) -> Result<VideoInfo, StreamError> {
        match &self.result {
            Ok(info) => Ok(info.clone()),
            Err(stderr) => Err(StreamError::from_stderr(stderr)),
        }
    }
}

fn format(id: &str, ext: &str, height: u32, acodec: &str, url: String) -> StreamFormat {
    StreamFormat {
        format_id: id.to_string(),
        ext: ext.to_string(),
        url: Some(url),
        protocol: Some("https".to_string()),
        height: Some(height),
        vcodec: Some("avc1.64001F".to_string()),
        acodec: Some(acodec.to_string()),
        ..Default::default()
    }
}

fn video(formats: Vec<StreamFormat>) -> VideoInfo {
    VideoInfo {
        id: "dQw4w9WgXcQ".to_string(),
        title: "Never Gonna Give You Up".to_string(),
        uploader: "Rick Astley".to_string(),
        formats,
        ..Default::default()
    }
}

fn streamer(result: Result<VideoInfo, String>) -> Streamer {
    Streamer::new(
        Box::new(StaticExtractor { result }),
        ExtractorConfig::default(),
        StreamFetcher::new(None, 5).unwrap(),
    )
}

async fn media_server() -> MockServer {
    let server = MockServer::start().await;
    for m in ["GET", "HEAD"] {
        Mock::given(method(m))
            .and(path("/22.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(BODY))
            .mount(&server)
            .await;
    }
    server
}

#[tokio::test]
async fn resolve_picks_highest_progressive_mp4() {
    let base = "https://media.example";
    let mut hd = format("22", "mp4", 720, "mp4a.40.2", format!("{}/22", base));
    hd.filesize = Some(52_428_800);
    let formats = vec![
        format("18", "mp4", 360, "mp4a.40.2", format!("{}/18", base)),
        hd,
        format("137", "mp4", 1080, "none", format!("{}/137", base)),
        format("43", "webm", 1080, "vorbis", format!("{}/43", base)),
    ];

    let resolved = streamer(Ok(video(formats)))
        .resolve("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        .await
        .unwrap();

    assert_eq!(resolved.stream_url, "https://media.example/22");
    assert_eq!(resolved.id, "dQw4w9WgXcQ");
    assert_eq!(resolved.title, "Never Gonna Give You Up");
    assert_eq!(resolved.filesize, 52_428_800);
}

#[tokio::test]
async fn resolve_probes_size_when_unknown() {
    let server = media_server().await;
    let formats = vec![format("22", "mp4", 720, "mp4a", format!("{}/22.mp4", server.uri()))];

    let resolved = streamer(Ok(video(formats)))
        .resolve("https://youtu.be/dQw4w9WgXcQ")
        .await
        .unwrap();

    assert_eq!(resolved.filesize, BODY.len() as u64);
}

#[tokio::test]
async fn resolve_reports_zero_when_size_unavailable() {
    let server = MockServer::start().await;
    let formats = vec![format("22", "mp4", 720, "mp4a", format!("{}/missing.mp4", server.uri()))];

    let resolved = streamer(Ok(video(formats)))
        .resolve("https://youtu.be/dQw4w9WgXcQ")
        .await
        .unwrap();

    assert_eq!(resolved.filesize, 0);
}

#[tokio::test]
async fn resolve_without_progressive_stream() {
    let formats = vec![
        format("137", "mp4", 1080, "none", "https://media.example/137".into()),
        format("43", "webm", 360, "vorbis", "https://media.example/43".into()),
    ];

    let err = streamer(Ok(video(formats)))
        .resolve("https://youtu.be/dQw4w9WgXcQ")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NoStream);
    assert_eq!(err.to_string(), "No suitable stream found");
}

#[tokio::test]
async fn extractor_failure_keeps_message() {
    let err = streamer(Err("ERROR: [youtube] dQw4w9WgXcQ: Private video".into()))
        .resolve("https://youtu.be/dQw4w9WgXcQ")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Failure);
    assert_eq!(err.to_string(), "[youtube] dQw4w9WgXcQ: Private video");
}

#[tokio::test]
async fn download_twice_into_same_directory() {
    let server = media_server().await;
    let formats = vec![format("22", "mp4", 720, "mp4a", format!("{}/22.mp4", server.uri()))];
    let streamer = streamer(Ok(video(formats)));

    let tmp = tempfile::tempdir().unwrap();
    let out_dir = tmp.path().join("vidtok_cache");

    let mut updates: Vec<DownloadProgress> = Vec::new();
    let mut sink = |p: DownloadProgress| updates.push(p);
    let first = streamer
        .download("https://youtu.be/dQw4w9WgXcQ", &out_dir, &mut sink)
        .await
        .unwrap();

    assert_eq!(first.title, "Never Gonna Give You Up");
    assert_eq!(first.path, out_dir.join("Never Gonna Give You Up.mp4"));
    assert_eq!(std::fs::read(&first.path).unwrap(), BODY);
    assert_eq!(updates.last().unwrap().downloaded, BODY.len() as u64);

    let second = streamer
        .download("https://youtu.be/dQw4w9WgXcQ", &out_dir, &mut |_: DownloadProgress| {})
        .await
        .unwrap();

    assert_eq!(second.path, first.path);
    let entries = std::fs::read_dir(&out_dir).unwrap().count();
    assert_eq!(entries, 1);
}

#[tokio::test]
async fn download_without_stream_creates_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let out_dir = tmp.path().join("vidtok_cache");

    let err = streamer(Ok(video(Vec::new())))
        .download("https://youtu.be/x", &out_dir, &mut |_: DownloadProgress| {})
        .await
        .unwrap_err();

    assert!(matches!(err, StreamError::NoSuitableStream));
    assert!(!out_dir.exists());
}
