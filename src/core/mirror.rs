use crate::adapters::http::HttpFetcher;
use crate::domain::ports::Storage;
use crate::utils::error::{RulesetError, Result};
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use std::cell::RefCell;
use tendril::StrTendril;
use url::Url;

/// 收集 `<a>` 開始標籤的 href；實體由 tokenizer 解碼
#[derive(Debug, Default)]
struct AnchorSink {
    hrefs: RefCell<Vec<String>>,
}

impl TokenSink for AnchorSink {
    type Handle = ();

    fn process_token(&self, token: Token, _line: u64) -> TokenSinkResult<()> {
        if let Token::TagToken(Tag {
            kind: TagKind::StartTag,
            name,
            attrs,
            ..
        }) = token
        {
            if &*name == "a" {
                if let Some(href) = attrs.iter().find(|attr| &*attr.name.local == "href") {
                    self.hrefs.borrow_mut().push(href.value.to_string());
                }
            }
        }
        TokenSinkResult::Continue
    }
}

fn anchor_hrefs(html: &str) -> Vec<String> {
    let tokenizer = Tokenizer::new(AnchorSink::default(), TokenizerOpts::default());
    let queue = BufferQueue::default();
    queue.push_back(StrTendril::from(html));

    let _ = tokenizer.feed(&queue);
    tokenizer.end();

    tokenizer.sink.hrefs.take()
}

/// 鏡像遠端目錄列表 (僅下一層子目錄) 到本地
pub struct DirectoryMirror<'a, S: Storage> {
    fetcher: &'a HttpFetcher,
    storage: S,
}

impl<'a, S: Storage> DirectoryMirror<'a, S> {
    pub fn new(fetcher: &'a HttpFetcher, storage: S) -> Self {
        Self { fetcher, storage }
    }

    /// 從 HTML 目錄頁收集連結，排除上層目錄、錨點、查詢與根目錄以外的連結
    pub fn extract_links(&self, base: &Url, root: &Url, html: &str) -> Vec<Url> {
        let mut links = Vec::new();
        for href in anchor_hrefs(html) {
            let href = href.trim();
            if href.is_empty()
                || href == "../"
                || href == "./"
                || href.starts_with('?')
                || href.starts_with('#')
            {
                continue;
            }
            let Ok(resolved) = base.join(href) else {
                continue;
            };
            if resolved.query().is_some() || !resolved.as_str().starts_with(root.as_str()) {
                continue;
            }
            if resolved == *base || links.contains(&resolved) {
                continue;
            }
            links.push(resolved);
        }
        links
    }

    fn relative_path(root: &Url, url: &Url) -> Option<String> {
        let relative = url.path().strip_prefix(root.path())?;
        let relative = relative.trim_start_matches('/');
        if relative.is_empty() || relative.split('/').any(|segment| segment == "..") {
            return None;
        }
        Some(relative.to_string())
    }

    /// 執行鏡像，回傳已保存的相對路徑。單一檔案失敗只記錄並略過
    pub async fn run(&self, root_url: &str) -> Result<Vec<String>> {
        let mut root = Url::parse(root_url)?;
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }

        tracing::info!("🌐 Crawling {}", root);
        let listing = self
            .fetcher
            .get_text(root.as_str())
            .await
            .map_err(|e| RulesetError::FetchError {
                source_name: "mirror".to_string(),
                url: root.to_string(),
                message: e.to_string(),
            })?;

        let mut files = Vec::new();
        for link in self.extract_links(&root, &root, &listing) {
            if link.path().ends_with('/') {
                match self.fetcher.get_text(link.as_str()).await {
                    Ok(sub_listing) => {
                        for file in self.extract_links(&link, &root, &sub_listing) {
                            if !file.path().ends_with('/') && !files.contains(&file) {
                                files.push(file);
                            }
                        }
                    }
                    Err(e) => tracing::warn!("Skipping directory {}: {}", link, e),
                }
            } else if !files.contains(&link) {
                files.push(link);
            }
        }

        let mut saved = Vec::new();
        for file in files {
            let Some(relative) = Self::relative_path(&root, &file) else {
                continue;
            };
            let body = match self.fetcher.get_text(file.as_str()).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", file, e);
                    continue;
                }
            };
            self.storage.write_file(&relative, body.as_bytes()).await?;
            saved.push(relative);
        }

        tracing::info!("📥 Mirrored {} files", saved.len());
        Ok(saved)
    }
}
