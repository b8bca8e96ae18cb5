//! PROPFIND request body and `207 Multi-Status` response parsing.

use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::Event;
use url::{Position, Url};

use super::dav_transport::{DIRECTORY_CONTENT_TYPE, DavEntry, Result, TransportError};

/// The properties requested for every listing and metadata fetch.
pub(crate) const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:">
  <D:prop>
    <D:resourcetype/>
    <D:getcontenttype/>
    <D:getcontentlength/>
    <D:creationdate/>
    <D:getlastmodified/>
  </D:prop>
</D:propfind>"#;

/// Properties collected for one `<D:response>` element.
#[derive(Default)]
struct PendingEntry {
    href: Option<String>,
    is_collection: bool,
    content_type: Option<String>,
    content_length: Option<u64>,
    created_at: Option<DateTime<Utc>>,
    modified_at: Option<DateTime<Utc>>,
}

impl PendingEntry {
    fn set_property(&mut self, name: &[u8], text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        match name {
            b"href" => self.href = Some(text.to_string()),
            b"getcontenttype" => self.content_type = Some(text.to_string()),
            b"getcontentlength" => self.content_length = text.parse().ok(),
            b"creationdate" => {
                self.created_at = DateTime::parse_from_rfc3339(text)
                    .ok()
                    .map(|d| d.with_timezone(&Utc))
            }
            b"getlastmodified" => {
                self.modified_at = DateTime::parse_from_rfc2822(text)
                    .ok()
                    .map(|d| d.with_timezone(&Utc))
            }
            _ => {}
        }
    }

    fn finish(self, base: &Url, origin: &str) -> Result<DavEntry> {
        let href = self
            .href
            .ok_or_else(|| TransportError::other("multistatus response without href"))?;
        let resolved = base
            .join(&href)
            .map_err(|e| TransportError::other(format!("invalid href {}: {}", href, e)))?;

        // Same-server entries keep the request's spelling of scheme, host and
        // port so callers can match them against their own root.
        let mut url = if resolved.origin() != base.origin() {
            resolved.to_string()
        } else if href.starts_with('/') && !href.starts_with("//") {
            format!("{}{}", origin, href)
        } else if href.contains("://") {
            format!("{}{}", origin, &href[origin_of(&href).len()..])
        } else {
            format!("{}{}", origin, &resolved[Position::BeforePath..])
        };
        if self.is_collection && !url.ends_with('/') {
            url.push('/');
        }
        let is_current_directory =
            resolved.as_str().trim_end_matches('/') == base.as_str().trim_end_matches('/');

        // Servers disagree on the content type of collections; report the
        // directory marker for all of them.
        let content_type = if self.is_collection {
            Some(DIRECTORY_CONTENT_TYPE.to_string())
        } else {
            self.content_type
        };

        Ok(DavEntry {
            url,
            is_current_directory,
            content_type,
            content_length: self.content_length,
            created_at: self.created_at,
            modified_at: self.modified_at,
        })
    }
}

/// The `scheme://authority` prefix of `url`, as written.
fn origin_of(url: &str) -> &str {
    let start = url.find("://").map_or(0, |idx| idx + 3);
    match url[start..].find('/') {
        Some(idx) => &url[..start + idx],
        None => url,
    }
}

/// Parse a multistatus body returned for a PROPFIND on `request_url`.
pub(crate) fn parse_multistatus(request_url: &str, body: &str) -> Result<Vec<DavEntry>> {
    let base = Url::parse(request_url)
        .map_err(|e| TransportError::other(format!("invalid url {}: {}", request_url, e)))?;

    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<PendingEntry> = None;
    let mut open_elements: Vec<Vec<u8>> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| TransportError::other(format!("malformed multistatus: {}", e)))?;
        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                match name.as_slice() {
                    b"response" => current = Some(PendingEntry::default()),
                    b"collection" => {
                        if let Some(entry) = current.as_mut() {
                            entry.is_collection = true;
                        }
                    }
                    _ => {}
                }
                open_elements.push(name);
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"collection" {
                    if let Some(entry) = current.as_mut() {
                        entry.is_collection = true;
                    }
                }
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| TransportError::other(format!("malformed multistatus: {}", e)))?;
                if let (Some(entry), Some(name)) = (current.as_mut(), open_elements.last()) {
                    entry.set_property(name, &text);
                }
            }
            Event::End(e) => {
                open_elements.pop();
                if e.local_name().as_ref() == b"response" {
                    if let Some(entry) = current.take() {
                        entries.push(entry.finish(&base, origin_of(request_url))?);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::location::{RootLocation, to_logical_scheme};

    const LISTING: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/hello/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/></D:resourcetype>
        <D:creationdate>2011-03-01T10:00:00Z</D:creationdate>
        <D:getlastmodified>Tue, 01 Mar 2011 10:00:00 GMT</D:getlastmodified>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/hello/mother</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>http://my.server/hello/file</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype/>
        <D:getcontenttype>text/xml</D:getcontenttype>
        <D:getcontentlength>1024</D:getcontentlength>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
    <D:propstat>
      <D:prop><D:creationdate/></D:prop>
      <D:status>HTTP/1.1 404 Not Found</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    #[test]
    fn test_parse_listing() {
        let entries = parse_multistatus("http://my.server/hello/", LISTING).unwrap();
        assert_eq!(entries.len(), 3);

        let own = &entries[0];
        assert_eq!(own.url, "http://my.server/hello/");
        assert!(own.is_current_directory);
        assert_eq!(own.content_type.as_deref(), Some(DIRECTORY_CONTENT_TYPE));
        assert_eq!(
            own.created_at.unwrap().to_rfc3339(),
            "2011-03-01T10:00:00+00:00"
        );
        assert_eq!(own.modified_at, own.created_at);

        let mother = &entries[1];
        assert_eq!(mother.url, "http://my.server/hello/mother/");
        assert!(!mother.is_current_directory);
        assert_eq!(mother.content_type.as_deref(), Some(DIRECTORY_CONTENT_TYPE));

        let file = &entries[2];
        assert_eq!(file.url, "http://my.server/hello/file");
        assert!(!file.is_current_directory);
        assert_eq!(file.content_type.as_deref(), Some("text/xml"));
        assert_eq!(file.content_length, Some(1024));
        assert_eq!(file.created_at, None);
    }

    #[test]
    fn test_request_without_trailing_slash_still_marks_self() {
        let entries = parse_multistatus("http://my.server/hello", LISTING).unwrap();
        assert!(entries[0].is_current_directory);
        assert!(!entries[1].is_current_directory);
    }

    #[test]
    fn test_entries_keep_request_spelling_of_host() {
        let body = r#"<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/repo/hello/</D:href>
    <D:propstat><D:prop><D:resourcetype><D:collection/></D:resourcetype></D:prop></D:propstat>
  </D:response>
  <D:response>
    <D:href>/repo/hello/file</D:href>
    <D:propstat><D:prop><D:resourcetype/></D:prop></D:propstat>
  </D:response>
  <D:response>
    <D:href>http://my.server/repo/hello/other</D:href>
    <D:propstat><D:prop><D:resourcetype/></D:prop></D:propstat>
  </D:response>
  <D:response>
    <D:href>sub</D:href>
    <D:propstat><D:prop><D:resourcetype><D:collection/></D:resourcetype></D:prop></D:propstat>
  </D:response>
</D:multistatus>"#;
        let entries = parse_multistatus("http://My.Server:80/repo/hello/", body).unwrap();

        let urls: Vec<&str> = entries.iter().map(|entry| entry.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "http://My.Server:80/repo/hello/",
                "http://My.Server:80/repo/hello/file",
                "http://My.Server:80/repo/hello/other",
                "http://My.Server:80/repo/hello/sub/",
            ]
        );
        assert!(entries[0].is_current_directory);
        assert!(!entries[1].is_current_directory);

        let root = RootLocation::new("webdav://My.Server:80/repo");
        assert_eq!(
            root.strip_root(&to_logical_scheme(&entries[1].url)).unwrap(),
            "hello/file"
        );
    }

    #[test]
    fn test_foreign_href_is_kept_absolute() {
        let body = r#"<D:multistatus xmlns:D="DAV:">
  <D:response><D:href>http://elsewhere/file</D:href></D:response>
</D:multistatus>"#;
        let entries = parse_multistatus("http://my.server/hello/", body).unwrap();
        assert_eq!(entries[0].url, "http://elsewhere/file");
    }

    #[test]
    fn test_missing_href_is_an_error() {
        let body = r#"<D:multistatus xmlns:D="DAV:"><D:response></D:response></D:multistatus>"#;
        assert!(parse_multistatus("http://my.server/", body).is_err());
    }

    #[test]
    fn test_empty_multistatus() {
        let body = r#"<D:multistatus xmlns:D="DAV:"></D:multistatus>"#;
        assert!(parse_multistatus("http://my.server/", body).unwrap().is_empty());
    }
}
