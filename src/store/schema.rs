pub const SCHEMA: &str = r#"
-- Manifest definitions, one namespace per project
CREATE TABLE IF NOT EXISTS data_manifest (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    project_code TEXT NOT NULL,
    UNIQUE(project_code, name)
);

-- Attribute schema of a manifest
CREATE TABLE IF NOT EXISTS data_attribute (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    manifest_id INTEGER NOT NULL REFERENCES data_manifest(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    type TEXT NOT NULL DEFAULT 'text' CHECK (type IN ('text', 'multiple_choice')),
    value TEXT,                  -- comma separated choices, NULL for text
    project_code TEXT NOT NULL,
    optional INTEGER NOT NULL DEFAULT 0,
    UNIQUE(manifest_id, name)
);

-- Published dataset versions
CREATE TABLE IF NOT EXISTS dataset_version (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    dataset_code TEXT NOT NULL,
    dataset_geid TEXT NOT NULL,
    version TEXT NOT NULL,
    created_by TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    location TEXT NOT NULL,
    notes TEXT
);

CREATE INDEX IF NOT EXISTS idx_data_manifest_project ON data_manifest(project_code);
CREATE INDEX IF NOT EXISTS idx_data_attribute_manifest ON data_attribute(manifest_id);
CREATE INDEX IF NOT EXISTS idx_dataset_version_geid ON dataset_version(dataset_geid);
"#;
