//! Interface version strings for CreateInterface
//!
//! These strings must match exactly what the TF2 binaries register.

// client
pub const CLIENT_DLL: &[u8] = b"VClient017\0";
pub const CLIENT_ENTITY_LIST: &[u8] = b"VClientEntityList003\0";

// engine
pub const ENGINE_CLIENT: &[u8] = b"VEngineClient014\0";
pub const MODEL_INFO: &[u8] = b"VModelInfoClient006\0";
pub const ENGINE_TRACE: &[u8] = b"EngineTraceClient003\0";
pub const RENDER_VIEW: &[u8] = b"VEngineRenderView014\0";
pub const MODEL_RENDER: &[u8] = b"VEngineModel016\0";
pub const GAME_EVENT_MANAGER: &[u8] = b"GAMEEVENTSMANAGER002\0";
pub const ENGINE_VGUI: &[u8] = b"VEngineVGui001\0";
pub const ENGINE_SERVER: &[u8] = b"VEngineServer023\0";
pub const PLUGIN_CALLBACKS: &[u8] = b"ISERVERPLUGINCALLBACKS003\0";

// vstdlib
pub const CVAR: &[u8] = b"VEngineCvar004\0";

// materialsystem / studiorender
pub const MATERIAL_SYSTEM: &[u8] = b"VMaterialSystem082\0";
pub const STUDIO_RENDER: &[u8] = b"VStudioRender025\0";

// vphysics
pub const PHYSICS: &[u8] = b"VPhysics031\0";
pub const PHYSICS_COLLISION: &[u8] = b"VPhysicsCollision007\0";

// inputsystem
pub const INPUT_SYSTEM: &[u8] = b"InputSystemVersion001\0";

// vgui2 / vguimatsurface
pub const VGUI_PANEL: &[u8] = b"VGUI_Panel009\0";
pub const VGUI_SURFACE: &[u8] = b"VGUI_Surface030\0";

// server
pub const PLAYER_INFO_MANAGER: &[u8] = b"PlayerInfoManager002\0";
pub const SERVER_GAME_DLL: &[u8] = b"ServerGameDLL012\0";

/// (name, module, version) for every interface the engine crate binds
pub const INTERFACE_TABLE: &[(&str, &str, &[u8])] = &[
    ("EngineClient", "engine", ENGINE_CLIENT),
    ("ClientDLL", "client", CLIENT_DLL),
    ("ClientEntityList", "client", CLIENT_ENTITY_LIST),
    ("ModelInfo", "engine", MODEL_INFO),
    ("EngineTrace", "engine", ENGINE_TRACE),
    ("Cvar", "vstdlib", CVAR),
    ("MaterialSystem", "materialsystem", MATERIAL_SYSTEM),
    ("RenderView", "engine", RENDER_VIEW),
    ("ModelRender", "engine", MODEL_RENDER),
    ("StudioRender", "studiorender", STUDIO_RENDER),
    ("Physics", "vphysics", PHYSICS),
    ("PhysicsCollision", "vphysics", PHYSICS_COLLISION),
    ("GameEventManager", "engine", GAME_EVENT_MANAGER),
    ("InputSystem", "inputsystem", INPUT_SYSTEM),
    ("Panel", "vgui2", VGUI_PANEL),
    ("Surface", "vguimatsurface", VGUI_SURFACE),
    ("EngineVGui", "engine", ENGINE_VGUI),
    ("EngineServer", "engine", ENGINE_SERVER),
    ("PlayerInfoManager", "server", PLAYER_INFO_MANAGER),
    ("ServerGameDLL", "server", SERVER_GAME_DLL),
];
