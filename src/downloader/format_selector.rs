// StreamQuery - chainable filtering over the formats yt-dlp reports
//
// Mirrors the usual "filter, order, pick first" selection:
//
//     StreamQuery::new(&info.formats)
//         .progressive(true)
//         .file_extension("mp4")
//         .order_by_resolution()
//         .desc()
//         .first()

use super::models::StreamFormat;

#[derive(Debug, Clone)]
pub struct StreamQuery<'a> {
    formats: Vec<&'a StreamFormat>,
}

impl<'a> StreamQuery<'a> {
    pub fn new(formats: &'a [StreamFormat]) -> Self {
        Self {
            formats: formats.iter().collect(),
        }
    }

    /// Keep only muxed (`true`) or only adaptive (`false`) renditions
    pub fn progressive(mut self, progressive: bool) -> Self {
        self.formats.retain(|f| f.is_progressive() == progressive);
        self
    }

    pub fn file_extension(mut self, ext: &str) -> Self {
        self.formats.retain(|f| f.ext.eq_ignore_ascii_case(ext));
        self
    }

    /// Ascending by height; bitrate breaks ties. Formats without a height
    /// sort first.
    pub fn order_by_resolution(mut self) -> Self {
        self.formats.sort_by(|a, b| {
            a.resolution().cmp(&b.resolution()).then_with(|| {
                a.tbr
                    .unwrap_or(0.0)
                    .partial_cmp(&b.tbr.unwrap_or(0.0))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });
        self
    }

    pub fn desc(mut self) -> Self {
        self.formats.reverse();
        self
    }

    pub fn first(&self) -> Option<&'a StreamFormat> {
        self.formats.first().copied()
    }
}

/// Best progressive MP4 rendition, highest resolution first
pub fn select_progressive_mp4(formats: &[StreamFormat]) -> Option<&StreamFormat> {
    StreamQuery::new(formats)
        .progressive(true)
        .file_extension("mp4")
        .order_by_resolution()
        .desc()
        .first()
}
