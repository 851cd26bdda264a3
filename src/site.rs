//! The site service: every engine, built once and passed by reference.
//!
//! ```text
//! Site
//! ├── config      SiteConfig (content paths resolved against the root)
//! ├── blog        BlogEngine      ← posts/*.md
//! ├── projects    ProjectEngine   ← projects/*.md
//! ├── knowledge   KnowledgeBase   ← data/knowledge_base.json
//! └── context     ContextStore    ← data/personal_info.json (strict)
//! ```
//!
//! Opening a site fails only on a bad config or a bad context document.
//! Missing content directories just mean empty collections.

use crate::blog::{BlogEngine, PostLoader, PostSettings};
use crate::config::{self, ConfigError, ContentConfig, SiteConfig};
use crate::context::{ContextError, ContextStore};
use crate::knowledge::KnowledgeBase;
use crate::projects::{ProjectEngine, ProjectLoader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Context error: {0}")]
    Context(#[from] ContextError),
}

pub struct Site {
    root: PathBuf,
    config: SiteConfig,
    paths: ContentConfig,
    blog: BlogEngine,
    projects: ProjectEngine,
    knowledge: KnowledgeBase,
    context: ContextStore,
}

impl Site {
    /// Build every engine for the site rooted at `root`.
    ///
    /// The context document is loaded eagerly; the other collections load on
    /// first read.
    pub fn open(root: &Path, config: SiteConfig) -> Result<Self, SiteError> {
        config.validate()?;
        let paths = config.content.resolve(root);
        let context = ContextStore::load(&paths.context)?;
        info!(root = %root.display(), "site opened");

        Ok(Self {
            root: root.to_path_buf(),
            blog: BlogEngine::new(PostLoader::new(
                &paths.posts_dir,
                PostSettings::from(&config.blog),
            )),
            projects: ProjectEngine::new(ProjectLoader::new(&paths.projects_dir, &config.projects)),
            knowledge: KnowledgeBase::new(&paths.knowledge_base),
            context,
            paths,
            config,
        })
    }

    /// Load `folio.toml` from `root` and open the site.
    pub fn load(root: &Path) -> Result<Self, SiteError> {
        let config = config::load_config(root)?;
        Self::open(root, config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Content locations resolved against the root.
    pub fn paths(&self) -> &ContentConfig {
        &self.paths
    }

    pub fn blog(&self) -> &BlogEngine {
        &self.blog
    }

    pub fn projects(&self) -> &ProjectEngine {
        &self.projects
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn context(&self) -> &ContextStore {
        &self.context
    }

    /// Whether drafts are visible.
    pub fn preview(&self) -> bool {
        self.config.serve.preview
    }

    /// Give the context store its explicit freshness check.
    ///
    /// A failed reload keeps the previous context and is only logged, so a
    /// half-saved document never takes the site down.
    pub fn refresh_context(&self) {
        if let Err(error) = self.context.reload_if_changed() {
            warn!(path = %self.context.path().display(), %error, "context reload failed, keeping previous");
        }
    }
}
