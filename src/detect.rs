//! Project detection that seeds generated defaults.
//!
//! Everything here looks at the project from the outside: dependency names in
//! `package.json`, marker files and directories, and the Biome formatter
//! config. Nothing is installed or executed.

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::parse::{parse_structured_text, ParsedText};

/// Marker files per framework, checked in order. The first hit wins.
const FRAMEWORK_FILES: &[(&str, &[&str])] = &[
    ("nextjs", &["next.config.js", "next.config.mjs", "next.config.ts"]),
    ("remix", &["remix.config.js", "remix.config.ts"]),
    ("astro", &["astro.config.mjs", "astro.config.ts", "astro.config.js"]),
    ("nuxt", &["nuxt.config.ts", "nuxt.config.js"]),
    ("svelte", &["svelte.config.js", "svelte.config.ts"]),
    ("wxt", &["wxt.config.ts"]),
    ("tauri", &["src-tauri/tauri.conf.json"]),
    ("vscode", &["vsc-extension-quickstart.md", ".vscode-test.mjs"]),
    ("vite", &["vite.config.ts", "vite.config.js", "vite.config.mjs"]),
];

const BIOME_FILES: &[&str] = &["biome.jsonc", "biome.json"];

const MAX_COMMANDS: usize = 10;
const MAX_THEMES: usize = 20;

/// Script names that every project has and are not worth recording.
const STANDARD_SCRIPTS: &[&str] = &["start", "build", "dev", "test"];

/// The parts of `package.json` detection looks at.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    dependencies: BTreeSet<String>,
    scripts: Vec<(String, String)>,
}

impl Manifest {
    /// Collects runtime and dev dependency names plus the scripts, in file order.
    pub fn from_value(manifest: &Value) -> Self {
        let mut dependencies = BTreeSet::new();
        for table in ["dependencies", "devDependencies"] {
            if let Some(Value::Object(deps)) = manifest.get(table) {
                dependencies.extend(deps.keys().cloned());
            }
        }
        let scripts = match manifest.get("scripts") {
            Some(Value::Object(scripts)) => scripts
                .iter()
                .filter_map(|(name, body)| Some((name.clone(), body.as_str()?.to_string())))
                .collect(),
            _ => Vec::new(),
        };
        Self {
            dependencies,
            scripts,
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.dependencies.contains(name)
    }

    pub fn has_any(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.has(name))
    }

    fn has_matching(&self, fragments: &[&str]) -> bool {
        self.dependencies
            .iter()
            .any(|dep| fragments.iter().any(|fragment| dep.contains(fragment)))
    }

    fn runs_bun_test(&self) -> bool {
        self.scripts.iter().any(|(_, body)| body.contains("bun test"))
    }
}

async fn exists(root: &Path, relative: &str) -> bool {
    tokio::fs::try_exists(root.join(relative))
        .await
        .unwrap_or(false)
}

fn first_hit(candidates: &[(&'static str, bool)]) -> Option<&'static str> {
    candidates
        .iter()
        .find(|(_, hit)| *hit)
        .map(|&(choice, _)| choice)
}

/// The framework whose marker file is present under `root`, if any.
pub async fn detect_project_framework(root: &Path) -> Option<&'static str> {
    for &(framework, files) in FRAMEWORK_FILES {
        for file in files {
            if exists(root, file).await {
                return Some(framework);
            }
        }
    }
    None
}

/// Detected `preferredLibraries` choices as `(slot, choice)` pairs.
///
/// Each slot takes the first matching candidate; undetected slots are left
/// out so the caller's defaults stay in place.
pub async fn detect_libraries(root: &Path, m: &Manifest) -> Vec<(&'static str, &'static str)> {
    let drizzle_config = exists(root, "drizzle.config.ts").await;
    let prisma_schema = exists(root, "prisma/schema.prisma").await;
    let next_auth_route = exists(root, "src/app/api/auth/[...nextauth]").await;
    let better_auth_route = exists(root, "src/app/api/auth/[...all]/route.ts").await;
    let shadcn_components = exists(root, "components/ui").await;
    let rest_routes = exists(root, "src/api").await || exists(root, "src/app/api").await;

    let database_provider = if drizzle_config {
        sniff_drizzle_provider(root).await
    } else {
        first_hit(&[
            ("pg", m.has_any(&["pg", "@neondatabase/serverless"])),
            ("mysql", m.has_any(&["mysql", "mysql2"])),
            ("sqlite", m.has_any(&["sqlite", "sqlite3", "better-sqlite3"])),
            ("mongodb", m.has_any(&["mongodb", "mongoose"])),
        ])
    };

    let slots = [
        (
            "databaseLibrary",
            first_hit(&[
                ("drizzle", m.has("drizzle-orm") || drizzle_config),
                ("prisma", m.has("@prisma/client") || prisma_schema),
                ("supabase", m.has("@supabase/supabase-js")),
            ]),
        ),
        ("databaseProvider", database_provider),
        (
            "authentication",
            first_hit(&[
                ("next-auth", next_auth_route),
                ("clerk", m.has("@clerk/nextjs")),
                ("better-auth", m.has("better-auth") && better_auth_route),
                ("auth0", m.has("@auth0/nextjs-auth0")),
                ("supabase-auth", m.has("@supabase/supabase-js")),
            ]),
        ),
        (
            "stateManagement",
            first_hit(&[
                ("zustand", m.has("zustand")),
                ("jotai", m.has("jotai")),
                ("redux-toolkit", m.has_any(&["@reduxjs/toolkit", "redux"])),
            ]),
        ),
        (
            "formManagement",
            first_hit(&[
                ("react-hook-form", m.has("react-hook-form")),
                ("formik", m.has("formik")),
            ]),
        ),
        (
            "styling",
            first_hit(&[
                ("tailwind", m.has("tailwindcss")),
                ("styled-components", m.has("styled-components")),
                ("css-modules", m.has_matching(&["css-loader", "css-modules"])),
                ("sass", m.has_any(&["sass", "node-sass"])),
            ]),
        ),
        (
            "uiComponents",
            first_hit(&[
                ("shadcn-ui", shadcn_components),
                ("chakra-ui", m.has("@chakra-ui/react")),
                ("material-ui", m.has("@mui/material")),
            ]),
        ),
        (
            "testing",
            first_hit(&[
                ("bun", m.runs_bun_test()),
                ("vitest", m.has("vitest")),
                ("jest", m.has("jest")),
                ("playwright", m.has("@playwright/test")),
                ("cypress", m.has("cypress")),
            ]),
        ),
        (
            "api",
            first_hit(&[
                ("hono", m.has("hono")),
                ("trpc", m.has("@trpc/server")),
                ("graphql", m.has_any(&["graphql", "apollo-server"])),
                ("rest", rest_routes),
            ]),
        ),
        (
            "validation",
            first_hit(&[
                ("zod", m.has("zod")),
                ("typebox", m.has("@sinclair/typebox")),
                ("valibot", m.has("valibot")),
            ]),
        ),
    ];

    slots
        .into_iter()
        .filter_map(|(slot, choice)| Some((slot, choice?)))
        .collect()
}

/// Reads the dialect out of `drizzle.config.ts` by substring, the way a
/// human skimming the file would.
async fn sniff_drizzle_provider(root: &Path) -> Option<&'static str> {
    let text = tokio::fs::read_to_string(root.join("drizzle.config.ts"))
        .await
        .ok()?;
    first_hit(&[
        ("pg", text.contains("postgres")),
        ("sqlite", text.contains("sqlite")),
        ("mysql", text.contains("mysql")),
    ])
}

/// The whole `features` object as detected from dependencies and files.
pub async fn detect_features(root: &Path, m: &Manifest) -> Map<String, Value> {
    let shadcn_components = exists(root, "components/ui").await;
    let rest_routes = exists(root, "src/api").await || exists(root, "src/app/api").await;
    let docker = exists(root, "Dockerfile").await;
    let ci = exists(root, ".github/workflows").await || exists(root, ".gitlab-ci.yml").await;

    let mut language = vec!["typescript"];
    if m.has("python") || exists(root, "requirements.txt").await {
        language.push("python");
    }
    if exists(root, "go.mod").await {
        language.push("go");
    }
    if exists(root, "Cargo.toml").await {
        language.push("rust");
    }

    let webview: Vec<&str> = ["electron", "tauri", "capacitor", "react-native"]
        .into_iter()
        .filter(|name| m.has(name))
        .collect();

    let commands: Vec<&str> = m
        .scripts
        .iter()
        .map(|(name, _)| name.as_str())
        .filter(|name| !STANDARD_SCRIPTS.contains(name))
        .take(MAX_COMMANDS)
        .collect();

    let testing = m.runs_bun_test()
        || m.has_any(&["jest", "vitest", "@playwright/test", "cypress"]);
    let database = m.has_any(&[
        "@prisma/client",
        "drizzle-orm",
        "@supabase/supabase-js",
        "mongoose",
        "pg",
        "@neondatabase/serverless",
        "mysql",
        "mysql2",
        "sqlite",
        "sqlite3",
        "better-sqlite3",
        "mongodb",
    ]);

    let features = json!({
        "i18n": m.has_any(&["next-intl", "i18next", "react-i18next", "rosetta"]),
        "analytics": m.has_any(&[
            "@vercel/analytics",
            "@segment/analytics-next",
            "ga-4-react",
            "react-ga",
            "next-plausible",
            "fathom-client",
        ]),
        "themeMode": "dark-light",
        "authentication": m.has_any(&[
            "next-auth",
            "@clerk/nextjs",
            "better-auth",
            "@auth0/nextjs-auth0",
            "@supabase/supabase-js",
        ]),
        "api": rest_routes || m.has_any(&["hono", "@trpc/server", "graphql", "apollo-server"]),
        "database": database,
        "testing": testing,
        "docker": docker,
        "ci": ci,
        "commands": commands,
        "webview": webview,
        "language": language,
        "themes": detect_themes(m, shadcn_components),
    });

    match features {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Style-related tags for everything recognisable in the dependency list.
fn detect_themes(m: &Manifest, shadcn_components: bool) -> Vec<&'static str> {
    let tagged = [
        ("tailwind", m.has("tailwindcss")),
        ("chakra", m.has("@chakra-ui/react")),
        ("material", m.has("@mui/material")),
        ("styled-components", m.has("styled-components")),
        ("css-modules", m.has_matching(&["css-loader", "css-modules"])),
        ("sass", m.has_any(&["sass", "node-sass"])),
        ("shadcn", shadcn_components),
        ("zustand", m.has("zustand")),
        ("jotai", m.has("jotai")),
        ("redux", m.has_any(&["@reduxjs/toolkit", "redux"])),
        ("react-hook-form", m.has("react-hook-form")),
        ("formik", m.has("formik")),
        ("eslint", m.has("eslint")),
        ("biome", m.has("@biomejs/biome")),
        ("stripe", m.has_any(&["stripe", "@stripe/stripe-js"])),
        ("sentry", m.has_any(&["@sentry/nextjs", "@sentry/react"])),
        ("axiom", m.has("next-axiom")),
        ("sonner", m.has("sonner")),
        ("algolia", m.has_any(&["algoliasearch", "react-instantsearch"])),
        ("uploadthing", m.has("uploadthing")),
        ("zod", m.has("zod")),
        ("typebox", m.has("@sinclair/typebox")),
        ("valibot", m.has("valibot")),
        ("starlight", m.has("@astrojs/starlight")),
        ("nextra", m.has("nextra")),
        ("lucide", m.has("lucide-react")),
        ("resend", m.has("resend")),
        ("redis", m.has_any(&["redis", "@upstash/redis"])),
        ("cloudflare", m.has_any(&["cloudflare", "@cloudflare/workers-types"])),
        ("contentlayer", m.has("contentlayer")),
        ("next-seo", m.has("next-seo")),
        ("framer-motion", m.has("framer-motion")),
        ("recharts", m.has("recharts")),
        ("dayjs", m.has("dayjs")),
        ("mdx", m.has_any(&["mdx", "@next/mdx"])),
    ];

    std::iter::once("default")
        .chain(tagged.into_iter().filter(|(_, hit)| *hit).map(|(tag, _)| tag))
        .take(MAX_THEMES)
        .collect()
}

/// `codeStyle` fields taken from the Biome formatter config, if one exists.
///
/// Only settings actually present in the file are returned, so the caller's
/// defaults fill the rest.
pub async fn read_biome_style(root: &Path) -> Option<Map<String, Value>> {
    let mut found = None;
    for name in BIOME_FILES {
        let path = root.join(name);
        if let Ok(text) = tokio::fs::read_to_string(&path).await {
            found = Some((path, text));
            break;
        }
    }
    let (path, text) = found?;

    let biome = match parse_structured_text(&text) {
        Ok(ParsedText::Parsed(doc) | ParsedText::Repaired(doc)) => doc.into_value(),
        Ok(ParsedText::Empty) => return None,
        Err(failure) => {
            debug!(path = %path.display(), reason = %failure, "ignoring unreadable biome config");
            return None;
        }
    };

    let formatter = &biome["formatter"];
    let js_formatter = &biome["javascript"]["formatter"];
    let mut style = Map::new();

    if let Some(width) = formatter["lineWidth"].as_u64() {
        style.insert("lineWidth".into(), width.into());
    }
    if let Some(width) = formatter["indentWidth"].as_u64() {
        style.insert("indentSize".into(), width.into());
        style.insert("tabWidth".into(), width.into());
    }
    if let Some(indent @ ("space" | "tab")) = formatter["indentStyle"].as_str() {
        style.insert("indentStyle".into(), indent.into());
    }
    if let Some(quote @ ("single" | "double")) = js_formatter["quoteStyle"].as_str() {
        style.insert("quoteMark".into(), quote.into());
    }
    if let Some(semicolons) = js_formatter["semicolons"].as_str() {
        style.insert("semicolons".into(), (semicolons == "always").into());
    }
    let trailing = js_formatter["trailingCommas"]
        .as_str()
        .or_else(|| js_formatter["trailingComma"].as_str());
    if let Some(trailing @ ("all" | "es5" | "none")) = trailing {
        style.insert("trailingComma".into(), trailing.into());
    }

    debug!(path = %path.display(), fields = style.len(), "read formatter settings from biome config");
    Some(style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, relative: &str, text: &str) {
        let path = dir.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }

    fn manifest(value: Value) -> Manifest {
        Manifest::from_value(&value)
    }

    #[tokio::test]
    async fn test_framework_comes_from_marker_files() {
        let dir = TempDir::new().unwrap();
        assert_eq!(detect_project_framework(dir.path()).await, None);

        touch(&dir, "vite.config.ts", "");
        assert_eq!(detect_project_framework(dir.path()).await, Some("vite"));

        touch(&dir, "next.config.mjs", "");
        assert_eq!(detect_project_framework(dir.path()).await, Some("nextjs"));
    }

    #[tokio::test]
    async fn test_libraries_follow_dependency_precedence() {
        let dir = TempDir::new().unwrap();
        let m = manifest(json!({
            "dependencies": {"@prisma/client": "5", "jotai": "2", "zod": "3", "hono": "4"},
            "devDependencies": {"redux": "5", "vitest": "1", "pg": "8"}
        }));

        let picks = detect_libraries(dir.path(), &m).await;
        assert!(picks.contains(&("databaseLibrary", "prisma")));
        assert!(picks.contains(&("databaseProvider", "pg")));
        assert!(picks.contains(&("stateManagement", "jotai")));
        assert!(picks.contains(&("testing", "vitest")));
        assert!(picks.contains(&("api", "hono")));
        assert!(picks.contains(&("validation", "zod")));
        assert!(!picks.iter().any(|(slot, _)| *slot == "styling"));
    }

    #[tokio::test]
    async fn test_drizzle_config_decides_the_provider() {
        let dir = TempDir::new().unwrap();
        touch(
            &dir,
            "drizzle.config.ts",
            "export default defineConfig({ dialect: \"sqlite\" });",
        );
        let m = manifest(json!({"dependencies": {"pg": "8"}}));

        let picks = detect_libraries(dir.path(), &m).await;
        assert!(picks.contains(&("databaseLibrary", "drizzle")));
        assert!(picks.contains(&("databaseProvider", "sqlite")));
    }

    #[tokio::test]
    async fn test_better_auth_needs_its_route() {
        let dir = TempDir::new().unwrap();
        let m = manifest(json!({"dependencies": {"better-auth": "1"}}));
        assert!(detect_libraries(dir.path(), &m).await.is_empty());

        touch(&dir, "src/app/api/auth/[...all]/route.ts", "");
        let picks = detect_libraries(dir.path(), &m).await;
        assert!(picks.contains(&("authentication", "better-auth")));
        assert!(picks.contains(&("api", "rest")));
    }

    #[tokio::test]
    async fn test_features_reflect_dependencies_and_files() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "Dockerfile", "FROM node");
        touch(&dir, ".github/workflows/ci.yml", "");
        touch(&dir, "Cargo.toml", "");
        let m = manifest(json!({
            "scripts": {"dev": "next dev", "lint": "eslint .", "check": "bun test"},
            "dependencies": {"next-intl": "3", "tailwindcss": "4", "electron": "30"}
        }));

        let features = detect_features(dir.path(), &m).await;
        assert_eq!(features["i18n"], json!(true));
        assert_eq!(features["testing"], json!(true));
        assert_eq!(features["docker"], json!(true));
        assert_eq!(features["ci"], json!(true));
        assert_eq!(features["database"], json!(false));
        assert_eq!(features["commands"], json!(["lint", "check"]));
        assert_eq!(features["webview"], json!(["electron"]));
        assert_eq!(features["language"], json!(["typescript", "rust"]));
        assert_eq!(features["themes"], json!(["default", "tailwind"]));
    }

    #[tokio::test]
    async fn test_biome_formatter_settings_are_mapped() {
        let dir = TempDir::new().unwrap();
        assert!(read_biome_style(dir.path()).await.is_none());

        touch(
            &dir,
            "biome.jsonc",
            r#"{
                // formatter
                "formatter": {"lineWidth": 100, "indentWidth": 4, "indentStyle": "tab"},
                "javascript": {"formatter": {"quoteStyle": "single", "semicolons": "asNeeded"}},
            }"#,
        );
        let style = read_biome_style(dir.path()).await.unwrap();
        assert_eq!(style["lineWidth"], json!(100));
        assert_eq!(style["indentSize"], json!(4));
        assert_eq!(style["tabWidth"], json!(4));
        assert_eq!(style["indentStyle"], json!("tab"));
        assert_eq!(style["quoteMark"], json!("single"));
        assert_eq!(style["semicolons"], json!(false));
        assert!(!style.contains_key("trailingComma"));
    }

    #[tokio::test]
    async fn test_unreadable_biome_config_is_ignored() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "biome.jsonc", "{ invalid");
        assert!(read_biome_style(dir.path()).await.is_none());
    }
}
