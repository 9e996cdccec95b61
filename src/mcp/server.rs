use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::client::CourseFinder;
use crate::core::config::CourseFinderConfig;
use crate::core::CourseFinderError;
use crate::toolkit::courses::{CourseQuery, CourseView};
use crate::toolkit::curriculum::{CurriculumPlan, CurriculumRequest};

const SEARCH_HELP: &str = r#"검색 가능한 방법들:

1. **과목 검색** (retrieve_courses)
   - 예시: "인공지능 관련 과목 추천해줘", "홍대 컴공 2학년 1학기 과목"
   - 대학명, 학과명, 학년, 학기를 질문에 넣으면 자동으로 필터링됩니다

2. **학과 목록 조회** (list_departments, get_universities_by_department)
   - 예시: "전체", "공학", "컴퓨터 / 소프트웨어 / 인공지능"
   - 학과를 고른 뒤 해당 학과를 개설한 대학 목록을 볼 수 있습니다

3. **커리큘럼 추천** (recommend_curriculum)
   - 예시: "홍익대 컴퓨터공학과 2학년부터 4학년까지 커리큘럼 추천해줘"
   - 관심 분야를 함께 주면 관련 과목을 먼저 고릅니다

4. **학과명 확인** (match_department_name)
   - 예시: "컴공", "설대 전전" 처럼 줄임말이나 은어를 표준 학과명으로 바꿉니다"#;


#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct ExtractFiltersParams {
    #[schemars(description = "Free-text question (e.g., '홍익대학교 컴퓨터공학과 1학년 필수 과목')")]
    pub query: String,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct RetrieveCoursesParams {
    #[schemars(description = "Search text; generated from the other fields when omitted")]
    pub query: Option<String>,
    #[schemars(description = "University (e.g., '홍익대학교')")]
    pub university: Option<String>,
    #[schemars(description = "College (e.g., '공과대학')")]
    pub college: Option<String>,
    #[schemars(description = "Department (e.g., '컴퓨터공학')")]
    pub department: Option<String>,
    #[schemars(description = "Grade (e.g., '1학년')")]
    pub grade: Option<String>,
    #[schemars(description = "Semester (e.g., '1학기')")]
    pub semester: Option<String>,
    #[schemars(description = "Max results (default: 5)")]
    pub top_k: Option<usize>,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct ListDepartmentsParams {
    #[schemars(description = "'전체' for every department, a field such as '공학', or keywords")]
    pub query: String,
    #[schemars(description = "Max results (default: 10)")]
    pub top_k: Option<usize>,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct UniversitiesByDepartmentParams {
    #[schemars(description = "Department name as listed by list_departments")]
    pub department_name: String,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct RecommendCurriculumParams {
    #[schemars(description = "University (e.g., '홍익대학교')")]
    pub university: String,
    #[schemars(description = "Department (e.g., '컴퓨터공학')")]
    pub department: String,
    #[schemars(description = "Interest keywords used to rank courses")]
    pub interests: Option<String>,
    #[schemars(description = "First grade (default: 2)")]
    pub start_grade: Option<u8>,
    #[schemars(description = "First semester (default: 1)")]
    pub start_semester: Option<u8>,
    #[schemars(description = "Last grade (default: 4)")]
    pub end_grade: Option<u8>,
    #[schemars(description = "Last semester (default: 2)")]
    pub end_semester: Option<u8>,
    #[schemars(description = "Courses per semester (default: 5)")]
    pub courses_per_semester: Option<usize>,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct MatchDepartmentParams {
    #[schemars(description = "Department text, optionally prefixed by a university (e.g., '홍대 컴공')")]
    pub department_query: String,
}

impl RecommendCurriculumParams {
    fn into_request(self, candidate_pool: usize) -> CurriculumRequest {
        let defaults = CurriculumRequest::default();
        CurriculumRequest {
            university: self.university,
            department: self.department,
            interests: self.interests,
            start_grade: self.start_grade.unwrap_or(defaults.start_grade),
            start_semester: self.start_semester.unwrap_or(defaults.start_semester),
            end_grade: self.end_grade.unwrap_or(defaults.end_grade),
            end_semester: self.end_semester.unwrap_or(defaults.end_semester),
            per_term: self.courses_per_semester.unwrap_or(defaults.per_term),
            candidate_pool,
        }
    }
}


#[derive(Clone)]
pub struct CourseFinderMcpServer {
    finder: Arc<CourseFinder>,
    tool_router: ToolRouter<Self>,
}

impl CourseFinderMcpServer {
    pub fn new(finder: CourseFinder) -> Self {
        Self {
            finder: Arc::new(finder),
            tool_router: Self::tool_router(),
        }
    }

    fn convert_error(err: CourseFinderError) -> McpError {
        match err {
            CourseFinderError::Configuration(msg) => McpError::invalid_params(msg, None),
            other => McpError::internal_error(other.to_string(), None),
        }
    }

    fn result_to_json<T: Serialize>(result: T) -> Result<String, McpError> {
        serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }

    fn success<T: Serialize>(result: T) -> Result<CallToolResult, McpError> {
        let json = Self::result_to_json(result)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    fn no_results(message: String, suggestion: &str) -> Value {
        json!({
            "error": "no_results",
            "message": message,
            "suggestion": suggestion,
        })
    }
}

#[tool_router]
impl CourseFinderMcpServer {
    #[tool(description = "Extract university, college, department, grade and semester from a question. Returns: {field: value} and the store filter")]
    async fn extract_filters(
        &self,
        Parameters(params): Parameters<ExtractFiltersParams>,
    ) -> Result<CallToolResult, McpError> {
        let filters = self.finder.extract(&params.query);
        let filter = self.finder.build_filter(&filters);

        Self::success(json!({
            "filters": filters,
            "filter": filter.map(|f| f.to_json()),
        }))
    }

    #[tool(description = "Search courses. Filters are extracted from the query; explicit fields take precedence. Returns: [{id, name, university, college, department, grade_semester, classification, description}]")]
    async fn retrieve_courses(
        &self,
        Parameters(params): Parameters<RetrieveCoursesParams>,
    ) -> Result<CallToolResult, McpError> {
        let query = CourseQuery {
            query: params.query,
            university: params.university,
            college: params.college,
            department: params.department,
            grade: params.grade,
            semester: params.semester,
            top_k: params.top_k.unwrap_or(self.finder.config().default_top_k),
        };
        info!("🔍 Searching courses: '{}'", crate::safe_truncate(&query.effective_query(), 50));

        let documents = self
            .finder
            .search_courses(&query)
            .await
            .map_err(Self::convert_error)?;

        if documents.is_empty() {
            warn!("⚠️ No courses found");
            return Self::success(Self::no_results(
                "사용자 질문에 대한 정보를 가져올 수 없었습니다.".to_string(),
                "get_search_help 툴을 사용하여 검색 가능한 방법을 안내하세요.",
            ));
        }

        info!("✅ Found {} courses", documents.len());
        Self::success(CourseView::from_documents(&documents))
    }

    #[tool(description = "List department names. '전체' lists all; a field such as '공학' or keywords rank departments by keyword and embedding similarity. Returns: [name]")]
    async fn list_departments(
        &self,
        Parameters(params): Parameters<ListDepartmentsParams>,
    ) -> Result<CallToolResult, McpError> {
        let names = self
            .finder
            .list_departments(&params.query, params.top_k.unwrap_or(10))
            .await
            .map_err(Self::convert_error)?;

        info!("✅ Listed {} departments for '{}'", names.len(), params.query);
        Self::success(names)
    }

    #[tool(description = "Universities offering a department. Returns: [{university, college, department}]")]
    async fn get_universities_by_department(
        &self,
        Parameters(params): Parameters<UniversitiesByDepartmentParams>,
    ) -> Result<CallToolResult, McpError> {
        let rows = self
            .finder
            .universities_for_department(&params.department_name)
            .await
            .map_err(Self::convert_error)?;

        if rows.is_empty() {
            warn!("⚠️ No universities offer '{}'", params.department_name);
            return Self::success(Self::no_results(
                format!("'{}' 학과를 개설한 대학을 찾을 수 없습니다.", params.department_name),
                "학과명을 정확히 확인하거나 list_departments로 사용 가능한 학과 목록을 먼저 조회하세요.",
            ));
        }

        Self::success(rows)
    }

    #[tool(description = "Recommend courses term by term without repeating a course. Returns: [{label, grade, semester, courses, status}]")]
    async fn recommend_curriculum(
        &self,
        Parameters(params): Parameters<RecommendCurriculumParams>,
    ) -> Result<CallToolResult, McpError> {
        let request = params.into_request(self.finder.config().curriculum_candidates);
        info!("📚 Curriculum for {} {}", request.university, request.department);

        match self.finder.recommend(&request).await {
            CurriculumPlan::Planned { terms } => Self::success(terms),
            CurriculumPlan::NoResults { .. } => Self::success(Self::no_results(
                "사용자 질문에 대한 정보를 가져올 수 없었습니다.".to_string(),
                "get_search_help 툴을 사용하여 검색 가능한 방법을 안내하세요.",
            )),
        }
    }

    #[tool(description = "Map a department nickname to the closest known department, splitting off a leading university. Returns: {input, university?, matched_department, similarity}")]
    async fn match_department_name(
        &self,
        Parameters(params): Parameters<MatchDepartmentParams>,
    ) -> Result<CallToolResult, McpError> {
        let matched = self
            .finder
            .match_department(&params.department_query)
            .await
            .map_err(Self::convert_error)?;

        match matched {
            Some(matched) => Self::success(matched),
            None => Self::success(Self::no_results(
                format!("'{}'에 해당하는 학과를 찾을 수 없습니다.", params.department_query),
                "list_departments로 사용 가능한 학과 목록을 먼저 조회하세요.",
            )),
        }
    }

    #[tool(description = "Usage guide for when other tools return no results")]
    async fn get_search_help(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(SEARCH_HELP)]))
    }
}

#[tool_handler]
impl ServerHandler for CourseFinderMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "coursefinder".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Korean university course catalog search. Use retrieve_courses for course \
                 questions, list_departments and get_universities_by_department to browse, \
                 recommend_curriculum for multi-semester plans, and get_search_help when a \
                 search comes back empty."
                    .to_string(),
            ),
        }
    }
}


pub async fn run_server() -> anyhow::Result<()> {
    info!("🚀 Initializing CourseFinder MCP Server...");

    let config = match std::env::var("COURSEFINDER_CONFIG") {
        Ok(path) => CourseFinderConfig::load(&path)?,
        Err(_) => CourseFinderConfig::from_env(),
    };
    let finder = CourseFinder::from_config(config).await?;

    info!("✅ CourseFinder MCP Server ready");
    info!(
        "   🤖 Embeddings: {}/{}",
        finder.config().embedding_provider,
        finder.config().embedding_model
    );
    info!("   📂 Catalog: {}", finder.config().catalog_path);

    let server = CourseFinderMcpServer::new(finder);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
