//! Built-in client locations.

use super::BaseDir::{AppData, Home, UserProfile};
use super::HostOs::{Linux, MacOs, Windows};
use super::{ClientDefinition, PathCandidate};
use crate::types::DocumentFormat::{ClaudeDesktop, Continue, SimpleJson, Toml, VsCode, Yaml};

macro_rules! mac {
    ($base:expr, $relative:expr $(,)?) => {
        PathCandidate { os: MacOs, base: $base, relative: $relative }
    };
}

macro_rules! win {
    ($base:expr, $relative:expr $(,)?) => {
        PathCandidate { os: Windows, base: $base, relative: $relative }
    };
}

macro_rules! linux {
    ($base:expr, $relative:expr $(,)?) => {
        PathCandidate { os: Linux, base: $base, relative: $relative }
    };
}

macro_rules! client {
    ($id:expr, $name:expr, $format:expr, $paths:expr $(,)?) => {
        ClientDefinition { id: $id, name: $name, format: $format, key: None, paths: $paths }
    };
}

const VSCODE_PATHS: &[PathCandidate] = &[
    mac!(Home, &["Library", "Application Support", "Code", "User", "settings.json"]),
    win!(AppData, &["Code", "User", "settings.json"]),
    linux!(Home, &[".config", "Code", "User", "settings.json"]),
];

pub(super) static BUILTIN: &[ClientDefinition] = &[
    client!(
        "claude-desktop",
        "Claude Desktop",
        ClaudeDesktop,
        &[
            mac!(Home, &["Library", "Application Support", "Claude", "claude_desktop_config.json"]),
            win!(AppData, &["Claude", "claude_desktop_config.json"]),
            linux!(Home, &[".config", "Claude", "claude_desktop_config.json"]),
        ],
    ),
    client!(
        "claude-code",
        "Claude Code",
        SimpleJson,
        &[
            mac!(Home, &[".claude.json"]),
            win!(UserProfile, &[".claude.json"]),
            linux!(Home, &[".claude.json"]),
        ],
    ),
    client!(
        "cursor",
        "Cursor",
        SimpleJson,
        &[
            mac!(Home, &[".cursor", "mcp.json"]),
            mac!(Home, &["Library", "Application Support", "Cursor", "User", "mcp.json"]),
            win!(AppData, &["Cursor", "User", "mcp.json"]),
            linux!(Home, &[".cursor", "mcp.json"]),
        ],
    ),
    client!(
        "windsurf",
        "Windsurf",
        SimpleJson,
        &[
            mac!(Home, &[".codeium", "windsurf", "mcp_config.json"]),
            win!(UserProfile, &[".codeium", "windsurf", "mcp_config.json"]),
            linux!(Home, &[".codeium", "windsurf", "mcp_config.json"]),
        ],
    ),
    client!("vscode", "VS Code", VsCode, VSCODE_PATHS),
    client!(
        "vscode-insiders",
        "VS Code Insiders",
        VsCode,
        &[
            mac!(Home, &["Library", "Application Support", "Code - Insiders", "User", "settings.json"]),
            win!(AppData, &["Code - Insiders", "User", "settings.json"]),
            linux!(Home, &[".config", "Code - Insiders", "User", "settings.json"]),
        ],
    ),
    ClientDefinition {
        id: "cody",
        name: "Sourcegraph Cody",
        format: VsCode,
        key: Some("openctx.providers"),
        paths: VSCODE_PATHS,
    },
    client!(
        "cline",
        "Cline",
        SimpleJson,
        &[
            mac!(
                Home,
                &[
                    "Library",
                    "Application Support",
                    "Code",
                    "User",
                    "globalStorage",
                    "saoudrizwan.claude-dev",
                    "settings",
                    "cline_mcp_settings.json",
                ],
            ),
            win!(
                AppData,
                &[
                    "Code",
                    "User",
                    "globalStorage",
                    "saoudrizwan.claude-dev",
                    "settings",
                    "cline_mcp_settings.json",
                ],
            ),
            linux!(
                Home,
                &[
                    ".config",
                    "Code",
                    "User",
                    "globalStorage",
                    "saoudrizwan.claude-dev",
                    "settings",
                    "cline_mcp_settings.json",
                ],
            ),
        ],
    ),
    client!(
        "roo-code",
        "Roo Code",
        SimpleJson,
        &[
            mac!(
                Home,
                &[
                    "Library",
                    "Application Support",
                    "Code",
                    "User",
                    "globalStorage",
                    "rooveterinaryinc.roo-cline",
                    "settings",
                    "cline_mcp_settings.json",
                ],
            ),
            win!(
                AppData,
                &[
                    "Code",
                    "User",
                    "globalStorage",
                    "rooveterinaryinc.roo-cline",
                    "settings",
                    "cline_mcp_settings.json",
                ],
            ),
            linux!(
                Home,
                &[
                    ".config",
                    "Code",
                    "User",
                    "globalStorage",
                    "rooveterinaryinc.roo-cline",
                    "settings",
                    "cline_mcp_settings.json",
                ],
            ),
        ],
    ),
    client!(
        "zed",
        "Zed",
        SimpleJson,
        &[
            mac!(Home, &[".config", "zed", "settings.json"]),
            win!(AppData, &["Zed", "settings.json"]),
            linux!(Home, &[".config", "zed", "settings.json"]),
        ],
    ),
    client!(
        "trae",
        "Trae",
        SimpleJson,
        &[
            mac!(Home, &["Library", "Application Support", "Trae", "User", "globalStorage", "mcp.json"]),
            win!(AppData, &["Trae", "User", "globalStorage", "mcp.json"]),
            linux!(Home, &[".config", "Trae", "User", "globalStorage", "mcp.json"]),
        ],
    ),
    client!(
        "amazon-q",
        "Amazon Q",
        SimpleJson,
        &[
            mac!(Home, &[".aws", "amazonq", "mcp.json"]),
            win!(UserProfile, &[".aws", "amazonq", "mcp.json"]),
            linux!(Home, &[".aws", "amazonq", "mcp.json"]),
        ],
    ),
    client!(
        "jetbrains-junie",
        "JetBrains Junie",
        SimpleJson,
        &[
            mac!(Home, &[".junie", "mcp", "mcp.json"]),
            win!(Home, &[".junie", "mcp", "mcp.json"]),
            linux!(Home, &[".junie", "mcp", "mcp.json"]),
        ],
    ),
    client!(
        "continue",
        "Continue",
        Continue,
        &[
            mac!(Home, &[".continue", "config.json"]),
            win!(UserProfile, &[".continue", "config.json"]),
            linux!(Home, &[".continue", "config.json"]),
        ],
    ),
    client!(
        "lm-studio",
        "LM Studio",
        SimpleJson,
        &[
            mac!(Home, &[".lmstudio", "mcp.json"]),
            win!(UserProfile, &[".lmstudio", "mcp.json"]),
            linux!(Home, &[".lmstudio", "mcp.json"]),
        ],
    ),
    client!(
        "anythingllm",
        "AnythingLLM",
        SimpleJson,
        &[
            mac!(
                Home,
                &[
                    "Library",
                    "Application Support",
                    "anythingllm-desktop",
                    "storage",
                    "plugins",
                    "anythingllm_mcp_servers.json",
                ],
            ),
            win!(
                AppData,
                &["anythingllm-desktop", "storage", "plugins", "anythingllm_mcp_servers.json"],
            ),
            linux!(
                Home,
                &[".config", "anythingllm-desktop", "storage", "plugins", "anythingllm_mcp_servers.json"],
            ),
        ],
    ),
    client!(
        "tabby",
        "Tabby",
        Toml,
        &[
            mac!(Home, &[".tabby-client", "agent", "config.toml"]),
            win!(AppData, &["Tabby", "config.toml"]),
            win!(UserProfile, &[".tabby-client", "agent", "config.toml"]),
            linux!(Home, &[".tabby-client", "agent", "config.toml"]),
        ],
    ),
    client!(
        "librechat",
        "LibreChat",
        Yaml,
        &[
            mac!(Home, &["librechat.yaml"]),
            mac!(Home, &[".librechat", "librechat.yaml"]),
            win!(UserProfile, &["librechat.yaml"]),
            win!(UserProfile, &[".librechat", "librechat.yaml"]),
            linux!(Home, &["librechat.yaml"]),
            linux!(Home, &[".librechat", "librechat.yaml"]),
        ],
    ),
    client!(
        "goose",
        "Goose",
        Yaml,
        &[
            mac!(Home, &[".config", "goose", "config.yaml"]),
            win!(AppData, &["Block", "goose", "config", "config.yaml"]),
            linux!(Home, &[".config", "goose", "config.yaml"]),
        ],
    ),
    client!(
        "mistral-vibe",
        "Mistral Vibe",
        Toml,
        &[
            mac!(Home, &[".vibe", "config.toml"]),
            win!(UserProfile, &[".vibe", "config.toml"]),
            linux!(Home, &[".vibe", "config.toml"]),
        ],
    ),
    client!(
        "code-cli",
        "Code CLI",
        SimpleJson,
        &[
            mac!(Home, &[".config", "code-cli", "mcp.json"]),
            win!(AppData, &["code-cli", "mcp.json"]),
            linux!(Home, &[".config", "code-cli", "mcp.json"]),
        ],
    ),
    client!(
        "grok-cli",
        "Grok CLI",
        SimpleJson,
        &[
            mac!(Home, &[".grok", "config.json"]),
            win!(UserProfile, &[".grok", "config.json"]),
            linux!(Home, &[".grok", "config.json"]),
        ],
    ),
    client!(
        "open-interpreter",
        "Open Interpreter",
        Yaml,
        &[
            mac!(Home, &[".config", "open-interpreter", "config.yaml"]),
            win!(AppData, &["Open Interpreter", "config.yaml"]),
            linux!(Home, &[".config", "open-interpreter", "config.yaml"]),
        ],
    ),
    client!(
        "factory-cli",
        "Factory CLI",
        SimpleJson,
        &[
            mac!(Home, &[".factory", "config.json"]),
            win!(UserProfile, &[".factory", "config.json"]),
            linux!(Home, &[".factory", "config.json"]),
        ],
    ),
    client!(
        "aider",
        "Aider",
        Yaml,
        &[
            mac!(Home, &[".aider.conf.yml"]),
            win!(UserProfile, &[".aider.conf.yml"]),
            linux!(Home, &[".aider.conf.yml"]),
        ],
    ),
    client!(
        "pearai",
        "PearAI",
        SimpleJson,
        &[
            mac!(Home, &["Library", "Application Support", "PearAI", "User", "settings.json"]),
            win!(AppData, &["PearAI", "User", "settings.json"]),
            linux!(Home, &[".config", "PearAI", "User", "settings.json"]),
        ],
    ),
    client!(
        "void",
        "Void",
        VsCode,
        &[
            mac!(Home, &["Library", "Application Support", "Void", "User", "settings.json"]),
            win!(AppData, &["Void", "User", "settings.json"]),
            linux!(Home, &[".config", "Void", "User", "settings.json"]),
        ],
    ),
    client!(
        "melty",
        "Melty",
        VsCode,
        &[
            mac!(Home, &["Library", "Application Support", "Melty", "User", "settings.json"]),
            win!(AppData, &["Melty", "User", "settings.json"]),
            linux!(Home, &[".config", "Melty", "User", "settings.json"]),
        ],
    ),
    client!(
        "codebuddy",
        "CodeBuddy",
        VsCode,
        &[
            mac!(Home, &[".codebuddy", "settings.json"]),
            win!(UserProfile, &[".codebuddy", "settings.json"]),
            linux!(Home, &[".codebuddy", "settings.json"]),
        ],
    ),
    client!(
        "kiro",
        "Kiro",
        SimpleJson,
        &[
            mac!(Home, &[".kiro", "settings", "mcp.json"]),
            win!(UserProfile, &[".kiro", "settings", "mcp.json"]),
            linux!(Home, &[".kiro", "settings", "mcp.json"]),
        ],
    ),
    client!(
        "jan",
        "Jan",
        SimpleJson,
        &[
            mac!(Home, &["Library", "Application Support", "Jan", "data", "settings.json"]),
            mac!(Home, &["jan", "settings.json"]),
            win!(AppData, &["Jan", "data", "settings.json"]),
            win!(UserProfile, &["jan", "settings.json"]),
            linux!(Home, &[".config", "Jan", "data", "settings.json"]),
            linux!(Home, &["jan", "settings.json"]),
        ],
    ),
    // Warp's file has no extension, so the format cannot be inferred
    client!(
        "warp",
        "Warp",
        SimpleJson,
        &[
            mac!(Home, &[".local", "state", "warp-terminal", "mcp"]),
            win!(UserProfile, &[".local", "state", "warp-terminal", "mcp"]),
            win!(AppData, &["Warp", "mcp.json"]),
            linux!(Home, &[".local", "state", "warp-terminal", "mcp"]),
        ],
    ),
    client!(
        "llm-cli",
        "LLM CLI",
        SimpleJson,
        &[
            mac!(Home, &[".llm-tools-mcp", "mcp.json"]),
            mac!(Home, &[".config", "io.datasette.llm", "mcp.json"]),
            win!(UserProfile, &[".llm-tools-mcp", "mcp.json"]),
            win!(AppData, &["io.datasette.llm", "mcp.json"]),
            linux!(Home, &[".llm-tools-mcp", "mcp.json"]),
            linux!(Home, &[".config", "io.datasette.llm", "mcp.json"]),
        ],
    ),
    client!(
        "boltai",
        "BoltAI",
        SimpleJson,
        &[
            mac!(Home, &["Library", "Application Support", "BoltAI", "mcp.json"]),
            win!(AppData, &["BoltAI", "mcp.json"]),
        ],
    ),
];
