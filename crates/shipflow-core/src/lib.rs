//! ShipFlowコア機能
//!
//! パイプライン定義のモデル、KDLパーサー、テンプレート展開、
//! プロジェクトファイルの発見とロードを提供します。

pub mod discovery;
pub mod error;
pub mod loader;
pub mod model;
pub mod parser;
pub mod template;

pub use discovery::{DiscoveredFiles, discover_files, find_project_root};
pub use error::{PipelineError, Result};
pub use loader::{load_project, load_project_from_root, load_project_with_debug};
pub use model::*;
pub use parser::{parse_kdl_file, parse_kdl_string};
