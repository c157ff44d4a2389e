use once_cell::sync::Lazy;

use super::{Field, Shape};
use crate::document::{SCHEMA_DEV, SCHEMA_URL, UNKNOWN_VALUE};

const PROMPT_BEHAVIOR: &[&str] = &["prompt", "autoYes", "autoNo"];

static PROJECT_SCHEMA: Lazy<Shape> = Lazy::new(build_project_schema);

/// The schema every project document is checked against.
pub fn project_schema() -> &'static Shape {
    &PROJECT_SCHEMA
}

/// A known library choice, or the `unknown` placeholder.
fn library(choices: &'static [&'static str]) -> Shape {
    Shape::Literal(choices)
}

fn string_list() -> Shape {
    Shape::array_of(Shape::string())
}

fn features() -> Shape {
    Shape::Object(vec![
        Field::optional("i18n", Shape::Bool),
        Field::optional("analytics", Shape::Bool),
        Field::optional("themeMode", Shape::Literal(&["light", "dark", "dark-light"])),
        Field::optional("authentication", Shape::Bool),
        Field::optional("api", Shape::Bool),
        Field::optional("database", Shape::Bool),
        Field::optional("testing", Shape::Bool),
        Field::optional("docker", Shape::Bool),
        Field::optional("ci", Shape::Bool),
        Field::optional("commands", string_list()),
        Field::optional("webview", string_list()),
        Field::optional("language", string_list()),
        Field::optional("themes", string_list()),
    ])
}

fn code_style() -> Shape {
    let modernize = Shape::Object(vec![
        Field::optional("replaceFs", Shape::Bool),
        Field::optional("replacePath", Shape::Bool),
        Field::optional("replaceHttp", Shape::Bool),
        Field::optional("replaceProcess", Shape::Bool),
        Field::optional("replaceConsole", Shape::Bool),
        Field::optional("replaceEvents", Shape::Bool),
    ]);

    Shape::Object(vec![
        Field::optional("lineWidth", Shape::Number),
        Field::optional("indentSize", Shape::Number),
        Field::optional("indentStyle", Shape::Literal(&["space", "tab"])),
        Field::optional("quoteMark", Shape::Literal(&["single", "double"])),
        Field::optional("semicolons", Shape::Bool),
        Field::optional("trailingComma", Shape::Literal(&["none", "es5", "all"])),
        Field::optional("bracketSpacing", Shape::Bool),
        Field::optional("arrowParens", Shape::Literal(&["always", "avoid"])),
        Field::optional("tabWidth", Shape::Number),
        Field::optional("jsToTs", Shape::Bool),
        Field::optional("dontRemoveComments", Shape::Bool),
        Field::optional("shouldAddComments", Shape::Bool),
        Field::optional("typeOrInterface", Shape::Literal(&["type", "interface", "mixed"])),
        Field::optional("importOrRequire", Shape::Literal(&["import", "require", "mixed"])),
        Field::optional("cjsToEsm", Shape::Bool),
        Field::optional("modernize", modernize),
        Field::optional("importSymbol", Shape::string()),
    ])
}

fn monorepo() -> Shape {
    Shape::Object(vec![
        Field::optional(
            "type",
            Shape::Literal(&["none", "turborepo", "nx", "pnpm", "bun"]),
        ),
        Field::optional("packages", string_list()),
        Field::optional("sharedPackages", string_list()),
    ])
}

fn preferred_libraries() -> Shape {
    Shape::Object(vec![
        Field::optional(
            "stateManagement",
            library(&["zustand", "jotai", "redux-toolkit", UNKNOWN_VALUE]),
        ),
        Field::optional(
            "formManagement",
            library(&["react-hook-form", "formik", UNKNOWN_VALUE]),
        ),
        Field::optional(
            "styling",
            library(&["tailwind", "styled-components", "css-modules", "sass", UNKNOWN_VALUE]),
        ),
        Field::optional(
            "uiComponents",
            library(&["shadcn-ui", "chakra-ui", "material-ui", UNKNOWN_VALUE]),
        ),
        Field::optional(
            "testing",
            library(&["bun", "vitest", "jest", "playwright", "cypress", UNKNOWN_VALUE]),
        ),
        Field::optional(
            "authentication",
            library(&[
                "better-auth",
                "clerk",
                "next-auth",
                "supabase-auth",
                "auth0",
                UNKNOWN_VALUE,
            ]),
        ),
        Field::optional(
            "databaseLibrary",
            library(&["drizzle", "prisma", "supabase", UNKNOWN_VALUE]),
        ),
        Field::optional(
            "databaseProvider",
            library(&["pg", "mysql", "sqlite", "mongodb", UNKNOWN_VALUE]),
        ),
        Field::optional(
            "api",
            library(&["hono", "trpc", "graphql", "rest", UNKNOWN_VALUE]),
        ),
        Field::optional("linting", library(&["eslint", UNKNOWN_VALUE])),
        Field::optional("formatting", library(&["biome", UNKNOWN_VALUE])),
        Field::optional("payment", library(&["stripe", UNKNOWN_VALUE])),
        Field::optional("analytics", library(&["vercel", UNKNOWN_VALUE])),
        Field::optional("monitoring", library(&["sentry", UNKNOWN_VALUE])),
        Field::optional("logging", library(&["axiom", UNKNOWN_VALUE])),
        Field::optional("notifications", library(&["sonner", UNKNOWN_VALUE])),
        Field::optional("search", library(&["algolia", UNKNOWN_VALUE])),
        Field::optional("uploads", library(&["uploadthing", UNKNOWN_VALUE])),
        Field::optional(
            "validation",
            library(&["zod", "typebox", "valibot", UNKNOWN_VALUE]),
        ),
        Field::optional(
            "documentation",
            library(&["starlight", "nextra", UNKNOWN_VALUE]),
        ),
        Field::optional("icons", library(&["lucide", UNKNOWN_VALUE])),
        Field::optional("mail", library(&["resend", UNKNOWN_VALUE])),
        Field::optional("cache", library(&["redis", UNKNOWN_VALUE])),
        Field::optional("storage", library(&["cloudflare", UNKNOWN_VALUE])),
        Field::optional("cdn", library(&["cloudflare", UNKNOWN_VALUE])),
        Field::optional("cms", library(&["contentlayer", UNKNOWN_VALUE])),
        Field::optional("i18n", library(&["next-intl", UNKNOWN_VALUE])),
        Field::optional("seo", library(&["next-seo", UNKNOWN_VALUE])),
        Field::optional("motion", library(&["framer", UNKNOWN_VALUE])),
        Field::optional("charts", library(&["recharts", UNKNOWN_VALUE])),
        Field::optional("dates", library(&["dayjs", UNKNOWN_VALUE])),
        Field::optional("markdown", library(&["mdx", UNKNOWN_VALUE])),
        Field::optional(
            "routing",
            library(&["next", "react-router", "tanstack-router", UNKNOWN_VALUE]),
        ),
    ])
}

fn build_project_schema() -> Shape {
    Shape::Object(vec![
        Field::optional("$schema", Shape::Literal(&[SCHEMA_URL, SCHEMA_DEV])),
        // project metadata
        Field::required("projectName", Shape::non_empty_string()),
        Field::required("projectAuthor", Shape::non_empty_string()),
        Field::optional("projectDescription", Shape::string()),
        Field::optional("version", Shape::string()),
        Field::optional("projectLicense", Shape::string()),
        Field::optional("projectState", Shape::Literal(&["creating", "created"])),
        Field::optional("projectRepository", Shape::string()),
        Field::optional("projectDomain", Shape::string()),
        Field::optional(
            "projectCategory",
            Shape::Literal(&[
                UNKNOWN_VALUE,
                "website",
                "vscode",
                "browser",
                "cli",
                "library",
                "mobile",
            ]),
        ),
        Field::optional(
            "projectSubcategory",
            Shape::Literal(&[UNKNOWN_VALUE, "e-commerce", "tool"]),
        ),
        Field::optional(
            "projectTemplate",
            Shape::Literal(&[
                UNKNOWN_VALUE,
                "blefnk/relivator-nextjs-template",
                "blefnk/relivator-docker-template",
                "blefnk/next-react-ts-src-minimal",
                "blefnk/all-in-one-nextjs-template",
                "blefnk/create-t3-app",
                "blefnk/create-next-app",
                "blefnk/astro-starlight-template",
                "blefnk/versator-nextjs-template",
                "blefnk/relivator-lynxjs-template",
                "blefnk/relivator-react-native-template",
                "reliverse/template-browser-extension",
                "microsoft/vscode-extension-samples",
                "microsoft/vscode-extension-template",
                "rsetarter-template",
                "blefnk/deno-cli-tutorial",
            ]),
        ),
        Field::optional("projectTemplateDate", Shape::string()),
        Field::optional(
            "projectArchitecture",
            Shape::Literal(&[UNKNOWN_VALUE, "fullstack", "separated"]),
        ),
        Field::optional(
            "repoPrivacy",
            Shape::Literal(&[UNKNOWN_VALUE, "public", "private"]),
        ),
        Field::optional(
            "projectGitService",
            Shape::Literal(&["github", "gitlab", "bitbucket", "none"]),
        ),
        Field::optional(
            "projectDeployService",
            Shape::Literal(&["vercel", "netlify", "railway", "deno", "none"]),
        ),
        Field::optional("repoBranch", Shape::string()),
        // tech stack
        Field::optional(
            "projectFramework",
            Shape::Literal(&[
                UNKNOWN_VALUE,
                "nextjs",
                "vite",
                "svelte",
                "remix",
                "astro",
                "nuxt",
                "solid",
                "qwik",
                "vue",
                "wxt",
                "lynx",
                "react-native",
                "expo",
                "capacitor",
                "ionic",
                "electron",
                "tauri",
                "neutralino",
                "rempts",
                "citty",
                "commander",
                "cac",
                "meow",
                "yargs",
                "vscode",
                "webextension",
                "browser-extension",
                "npm-jsr",
            ]),
        ),
        Field::optional(
            "projectPackageManager",
            Shape::Literal(&["npm", "pnpm", "yarn", "bun"]),
        ),
        Field::optional("projectRuntime", Shape::Literal(&["node", "deno", "bun"])),
        Field::optional("preferredLibraries", preferred_libraries()),
        Field::optional("monorepo", monorepo()),
        Field::optional("ignoreDependencies", string_list()),
        Field::optional("customRules", Shape::record_of(Shape::Any)),
        Field::optional("features", features()),
        Field::optional("codeStyle", code_style()),
        // repo cloning
        Field::optional("multipleRepoCloneMode", Shape::Bool),
        Field::optional("customUserFocusedRepos", string_list()),
        Field::optional("customDevsFocusedRepos", string_list()),
        Field::optional("hideRepoSuggestions", Shape::Bool),
        Field::optional("customReposOnNewProject", Shape::Bool),
        Field::optional("envComposerOpenBrowser", Shape::Bool),
        // prompt policies
        Field::optional("skipPromptsUseAutoBehavior", Shape::Bool),
        Field::optional("deployBehavior", Shape::Literal(PROMPT_BEHAVIOR)),
        Field::optional("depsBehavior", Shape::Literal(PROMPT_BEHAVIOR)),
        Field::optional("gitBehavior", Shape::Literal(PROMPT_BEHAVIOR)),
        Field::optional("i18nBehavior", Shape::Literal(PROMPT_BEHAVIOR)),
        Field::optional("scriptsBehavior", Shape::Literal(PROMPT_BEHAVIOR)),
        Field::optional(
            "existingRepoBehavior",
            Shape::Literal(&["prompt", "autoYes", "autoYesSkipCommit", "autoNo"]),
        ),
        Field::optional(
            "relinterConfirm",
            Shape::Literal(&["promptOnce", "promptEachFile", "autoYes"]),
        ),
    ])
}
