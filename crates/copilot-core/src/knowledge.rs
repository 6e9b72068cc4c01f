//! Knowledge corpus catalog, loader and process-lifetime cache.
//!
//! The corpus is a fixed set of markdown documents shipped next to the
//! server binary.  On load each document is wrapped in a title/topics header
//! and concatenated under one audience preamble; a document that cannot be
//! read is replaced by a placeholder naming its declared topics so a single
//! missing file never breaks prompt construction.
//!
//! The assembled string is cached for the lifetime of the process via
//! [`CorpusCache`].  There is no invalidation: edits on disk are invisible
//! until restart.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use tracing::{info, warn};

/// A named, fixed text source in the knowledge catalog.
#[derive(Debug, Clone, Copy)]
pub struct KnowledgeDocument {
    pub id: &'static str,
    pub title: &'static str,
    pub filename: &'static str,
    pub topics: &'static str,
}

/// Documents for the executive / clinical audience.
///
/// `tech-presentation.md` is intentionally absent: it targets software
/// engineers and belongs to the technical profile only.
const EXECUTIVE_DOCUMENTS: &[KnowledgeDocument] = &[
    KnowledgeDocument {
        id: "VSDP",
        title: "VSDP: Vision Source Digital Platform Overview",
        filename: "VSDP.md",
        topics: "Platform overview, what VSDP does for patients and practices, stakeholder value propositions, provider benefits, pharma partnerships, big tech opportunities",
    },
    KnowledgeDocument {
        id: "Optometrys-future",
        title: "Optometry's Future: From Episodic to Continuous Care",
        filename: "Optometrys-future.md",
        topics: "Optometry transformation, moving from annual visits to year-round patient health monitoring, preventive health, Vision Source network, practice economics and growth",
    },
    KnowledgeDocument {
        id: "LIVING-INTELLIGENCE",
        title: "Living Intelligence: The VSDP AI Framework",
        filename: "LIVING-INTELLIGENCE.md",
        topics: "Living Intelligence concept, continuously updated patient health profiles, whole-body health monitoring through the eye, predictive health insights for clinicians",
    },
    KnowledgeDocument {
        id: "Market-Opportunities",
        title: "Market Opportunities for VSDP",
        filename: "Market -Opportunities.md",
        topics: "Market sizing, revenue opportunities for practices and Vision Source, growth projections, partnership models, competitive landscape",
    },
    KnowledgeDocument {
        id: "Market-Research-VSDP",
        title: "Market Research: VSDP Competitive Analysis",
        filename: "Market-Research-VSDP.md",
        topics: "How VSDP compares to other health platforms, market positioning, what makes Vision Source uniquely positioned, competitive differentiation",
    },
    KnowledgeDocument {
        id: "Strategic-Assessment",
        title: "Strategic Assessment: Vision Source and VSDP",
        filename: "Strategic-Assessment.md",
        topics: "Strategic strengths, risks, organizational readiness, implementation considerations, long-term competitive advantages for Vision Source",
    },
    KnowledgeDocument {
        id: "Strategic-Plan",
        title: "Strategic Plan: VSDP Rollout and Execution",
        filename: "Strategic-Plan.md",
        topics: "How VSDP rolls out across Vision Source practices, phases of adoption, milestones, what practices need to do to participate",
    },
    KnowledgeDocument {
        id: "Emerging-Technologies",
        title: "Emerging Technologies in Optometry and Digital Health",
        filename: "Emerging-Technologies.md",
        topics: "Smart contact lenses, retinal imaging breakthroughs, wearable health sensors, new diagnostic tools coming to optometry",
    },
    KnowledgeDocument {
        id: "Cross-Sector-Impact",
        title: "Cross-Sector Impact: The Strategic Horizon",
        filename: "Cross-Sector-Impact.md",
        topics: "How AI and health technology are converging, what this means for independent optometry over the next 1\u{2013}10 years, strategic planning for practice owners and boards",
    },
    KnowledgeDocument {
        id: "Collaborative-Intelligence",
        title: "Collaborative Intelligence",
        filename: "Collaborative-Intelligence.md",
        topics: "How AI and clinicians work together, human-AI collaboration in healthcare, augmenting doctor judgment \u{2014} not replacing it",
    },
    KnowledgeDocument {
        id: "Tech-Trends",
        title: "Technology Trends Shaping Digital Health",
        filename: "Tech-Trends.md",
        topics: "Broad technology trends in healthcare, AI adoption, wearables, connected health \u{2014} explained in terms of patient and practice impact",
    },
];

const TECHNICAL_DOCUMENTS: &[KnowledgeDocument] = &[
    KnowledgeDocument {
        id: "tech-presentation",
        title: "VSDP Technical Presentation",
        filename: "tech-presentation.md",
        topics: "Platform architecture, integration surface, data flows, engineering roadmap",
    },
    KnowledgeDocument {
        id: "VSDP",
        title: "VSDP: Vision Source Digital Platform Overview",
        filename: "VSDP.md",
        topics: "Platform overview, what VSDP does for patients and practices, stakeholder value propositions, provider benefits, pharma partnerships, big tech opportunities",
    },
    KnowledgeDocument {
        id: "LIVING-INTELLIGENCE",
        title: "Living Intelligence: The VSDP AI Framework",
        filename: "LIVING-INTELLIGENCE.md",
        topics: "Living Intelligence concept, continuously updated patient health profiles, whole-body health monitoring through the eye, predictive health insights for clinicians",
    },
];

/// Named document selection.
///
/// The original site accumulated divergent copies of the selection logic;
/// here the choice is plain configuration data.  `Executive` is the
/// canonical profile served by the landing pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KnowledgeProfile {
    #[default]
    Executive,
    Technical,
}

impl KnowledgeProfile {
    /// The config-string spelling of this profile.
    pub fn name(self) -> &'static str {
        match self {
            Self::Executive => "executive",
            Self::Technical => "technical",
        }
    }

    pub fn documents(self) -> &'static [KnowledgeDocument] {
        match self {
            Self::Executive => EXECUTIVE_DOCUMENTS,
            Self::Technical => TECHNICAL_DOCUMENTS,
        }
    }

    fn audience_reminder(self) -> &'static str {
        match self {
            Self::Executive => {
                "AUDIENCE REMINDER: You are speaking to board members, practice owners,\n\
                 optometrists, and healthcare executives \u{2014} NOT software engineers.\n\
                 \n\
                 When drawing from these documents:\n\
                 - Translate any technical language into plain clinical or business terms\n\
                 - Focus on patient outcomes, practice impact, and strategic opportunity\n\
                 - Never quote or describe software architecture, APIs, or code\n\
                 - If a document contains technical details, extract only the business\n\
                 \u{20}\u{20}or clinical insight it represents and express that in plain English\n\
                 - Cross-reference documents to give complete, confident answers"
            }
            Self::Technical => {
                "AUDIENCE REMINDER: You are speaking to software engineers and technical\n\
                 evaluators.  Precise architectural and integration detail is welcome;\n\
                 keep claims grounded in the documents below."
            }
        }
    }
}

impl std::str::FromStr for KnowledgeProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "executive" => Ok(Self::Executive),
            "technical" => Ok(Self::Technical),
            other => Err(format!("unknown knowledge profile '{other}'")),
        }
    }
}

/// Read every catalog document under `dir` and assemble the corpus string.
///
/// Read failures degrade to a per-document placeholder; this function never
/// fails as a whole.
pub fn load_corpus(dir: &Path, profile: KnowledgeProfile) -> String {
    let documents = profile.documents();

    let mut out = format!(
        "=================================================================\n\
         VSDP KNOWLEDGE BASE \u{2014} {} DOCUMENTS\n\
         =================================================================\n\
         {}\n\
         =================================================================\n\n",
        documents.len(),
        profile.audience_reminder(),
    );

    for doc in documents {
        let path = dir.join(doc.filename);
        let content = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!(id = doc.id, path = %path.display(), error = %e, "knowledge document unreadable; using placeholder");
                format!("[Document not yet loaded in this environment. Topics: {}]", doc.topics)
            }
        };
        out.push_str(&format!(
            "-----------------------------------------------------------------\n\
             DOCUMENT: {}\n\
             KEY TOPICS: {}\n\
             -----------------------------------------------------------------\n\
             {}\n\n",
            doc.title, doc.topics, content,
        ));
    }

    out
}

/// Process-lifetime cache for the assembled corpus.
///
/// Owned by the composition root and passed into handlers, never a global.
/// The first call reads from disk; every later call returns the same
/// `Arc<str>` even if the files change underneath.
#[derive(Debug, Default)]
pub struct CorpusCache {
    cached: OnceLock<Arc<str>>,
}

impl CorpusCache {
    pub fn new() -> Self {
        Self { cached: OnceLock::new() }
    }

    /// Return the cached corpus, loading it on first use.
    pub fn get_or_load(&self, dir: &Path, profile: KnowledgeProfile) -> Arc<str> {
        self.cached
            .get_or_init(|| {
                let corpus = load_corpus(dir, profile);
                info!(
                    documents = profile.documents().len(),
                    kib = corpus.len() / 1024,
                    "knowledge corpus loaded"
                );
                Arc::from(corpus)
            })
            .clone()
    }
}
