use serde::Serialize;
use std::sync::OnceLock;

/// Revision of the bundled question set; bump whenever questions or weights change.
pub const CATALOG_VERSION: &str = "iso9001:2015-r1";

#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: &'static str,
    pub text: &'static str,
    /// Point value of a fully satisfied answer, 1-5 with 5 the most critical.
    pub weight: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct Chapter {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub questions: Vec<Question>,
    #[serde(skip)]
    pub recommendation: &'static str,
}

impl Chapter {
    pub fn max_points(&self) -> u32 {
        self.questions
            .iter()
            .map(|question| u32::from(question.weight))
            .sum()
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions
            .iter()
            .find(|question| question.id == question_id)
    }
}

/// Fixed clause-by-clause questionnaire shipped with the build.
#[derive(Debug, Serialize)]
pub struct QuestionCatalog {
    pub version: &'static str,
    chapters: Vec<Chapter>,
}

const GENERIC_RECOMMENDATION: &str =
    "Review and strengthen this area according to ISO 9001 requirements";

impl QuestionCatalog {
    /// The ISO 9001:2015 catalog, built on first use and shared afterwards.
    pub fn iso9001() -> &'static QuestionCatalog {
        static CATALOG: OnceLock<QuestionCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| QuestionCatalog {
            version: CATALOG_VERSION,
            chapters: iso9001_chapters(),
        })
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter(&self, chapter_id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|chapter| chapter.id == chapter_id)
    }

    pub fn chapter_at(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    /// Finds a question anywhere in the catalog together with its chapter.
    pub fn locate(&self, question_id: &str) -> Option<(&Chapter, &Question)> {
        self.chapters.iter().find_map(|chapter| {
            chapter
                .question(question_id)
                .map(|question| (chapter, question))
        })
    }

    pub fn total_questions(&self) -> usize {
        self.chapters
            .iter()
            .map(|chapter| chapter.questions.len())
            .sum()
    }

    pub fn chapter_title(&self, chapter_id: &str) -> String {
        match self.chapter(chapter_id) {
            Some(chapter) => chapter.title.to_string(),
            None => format!("Chapter {chapter_id}"),
        }
    }

    pub fn recommendation_for(&self, chapter_id: &str) -> &'static str {
        self.chapter(chapter_id)
            .map(|chapter| chapter.recommendation)
            .unwrap_or(GENERIC_RECOMMENDATION)
    }
}

fn q(id: &'static str, text: &'static str, weight: u8) -> Question {
    Question { id, text, weight }
}

fn iso9001_chapters() -> Vec<Chapter> {
    vec![
        Chapter {
            id: "4",
            title: "Context of the Organization",
            description: "Understanding the organization and its context, stakeholders, and QMS scope",
            questions: vec![
                q("4.1.1", "Has the organization determined external and internal issues that are relevant to its purpose and strategic direction?", 5),
                q("4.1.2", "Are these issues monitored and reviewed regularly?", 4),
                q("4.2.1", "Have all relevant interested parties been identified?", 5),
                q("4.2.2", "Are the requirements of these interested parties determined and monitored?", 4),
                q("4.3.1", "Is the scope of the QMS clearly defined and documented?", 5),
                q("4.3.2", "Does the scope consider external and internal issues, interested parties, and products/services?", 4),
                q("4.4.1", "Has the organization established, implemented, and maintained a QMS?", 5),
                q("4.4.2", "Are QMS processes and their interactions clearly defined?", 4),
            ],
            recommendation: "Develop stakeholder analysis and organizational context documentation",
        },
        Chapter {
            id: "5",
            title: "Leadership",
            description: "Leadership commitment, quality policy, and organizational roles and responsibilities",
            questions: vec![
                q("5.1.1", "Does top management demonstrate leadership and commitment to the QMS?", 5),
                q("5.1.2", "Is top management taking accountability for QMS effectiveness?", 5),
                q("5.2.1", "Has top management established, implemented and maintained a quality policy?", 5),
                q("5.2.2", "Is the quality policy appropriate to the organization and its context?", 4),
                q("5.3.1", "Are organizational roles, responsibilities and authorities assigned and communicated?", 4),
                q("5.3.2", "Has management appointed a management representative for the QMS?", 3),
            ],
            recommendation: "Establish clear quality policy and leadership commitment procedures",
        },
        Chapter {
            id: "6",
            title: "Planning",
            description: "Risk management, quality objectives, and planning for changes",
            questions: vec![
                q("6.1.1", "Has the organization determined risks and opportunities that need to be addressed?", 5),
                q("6.1.2", "Are actions planned to address these risks and opportunities?", 5),
                q("6.2.1", "Are quality objectives established at relevant functions and levels?", 4),
                q("6.2.2", "Are quality objectives measurable, monitored, and communicated?", 4),
                q("6.3.1", "Is there a systematic approach for planning changes to the QMS?", 4),
            ],
            recommendation: "Create comprehensive quality objectives and risk management processes",
        },
        Chapter {
            id: "7",
            title: "Support",
            description: "Resources, competence, awareness, communication, and documented information",
            questions: vec![
                q("7.1.1", "Has the organization determined and provided necessary resources for the QMS?", 4),
                q("7.1.2", "Are infrastructure and environment suitable for process operations?", 4),
                q("7.2.1", "Are competency requirements determined for persons affecting QMS performance?", 4),
                q("7.2.2", "Is training provided where necessary to achieve required competence?", 4),
                q("7.3.1", "Are persons aware of the quality policy and their contribution to QMS effectiveness?", 3),
                q("7.4.1", "Are internal and external communications regarding the QMS determined?", 3),
                q("7.5.1", "Is documented information required by the QMS maintained?", 5),
                q("7.5.2", "Are documented information controls ensuring availability and protection?", 4),
            ],
            recommendation: "Implement resource allocation and competency management systems",
        },
        Chapter {
            id: "8",
            title: "Operation",
            description: "Operational planning, product/service requirements, design, production, and control",
            questions: vec![
                q("8.1.1", "Are processes needed to meet product and service requirements planned and controlled?", 5),
                q("8.2.1", "Are customer requirements and applicable legal requirements determined?", 5),
                q("8.2.2", "Is there a process for reviewing requirements before committing to supply?", 4),
                q("8.3.1", "Is there a design and development process (if applicable)?", 4),
                q("8.4.1", "Are externally provided processes, products and services controlled?", 4),
                q("8.5.1", "Is production and service provision controlled?", 5),
                q("8.6.1", "Are products and services verified against requirements?", 5),
                q("8.7.1", "Is nonconforming output controlled and addressed?", 5),
            ],
            recommendation: "Strengthen operational planning and process controls",
        },
        Chapter {
            id: "9",
            title: "Performance Evaluation",
            description: "Monitoring, measurement, analysis, internal audit, and management review",
            questions: vec![
                q("9.1.1", "Is QMS performance and effectiveness monitored and measured?", 5),
                q("9.1.2", "Are customer satisfaction levels monitored?", 5),
                q("9.1.3", "Is data analyzed to evaluate QMS performance and improvement opportunities?", 4),
                q("9.2.1", "Are internal audits conducted at planned intervals?", 5),
                q("9.2.2", "Do internal audits provide information on QMS conformity and effectiveness?", 4),
                q("9.3.1", "Does top management review the QMS at planned intervals?", 5),
                q("9.3.2", "Do management reviews consider all required inputs and produce defined outputs?", 4),
            ],
            recommendation: "Develop robust monitoring, measurement, and audit programs",
        },
        Chapter {
            id: "10",
            title: "Improvement",
            description: "Continual improvement, nonconformity, and corrective action",
            questions: vec![
                q("10.1.1", "Are opportunities for improvement identified and selected?", 4),
                q("10.2.1", "Are nonconformities identified and corrected?", 5),
                q("10.2.2", "Are corrective actions taken to eliminate causes of nonconformities?", 5),
                q("10.3.1", "Does the organization continually improve the QMS suitability and effectiveness?", 4),
            ],
            recommendation: "Establish systematic nonconformity and improvement processes",
        },
    ]
}
