//! Locally generated page content: the script injected after every page
//! load and the fallback document shown when the game fails to load.

/// Script evaluated on every finished navigation.
///
/// Suppresses selection and the context menu, registers a passive touch
/// listener, forwards `postMessage` envelopes carrying a `type` to the
/// bridge and routes the fullscreen API through the bridge.
pub fn injected_script(namespace: &str) -> String {
    format!(
        r#"(function() {{
    var root = document.documentElement;
    root.style.userSelect = 'none';
    root.style.webkitUserSelect = 'none';
    root.style.webkitTouchCallout = 'none';

    document.addEventListener('contextmenu', function(e) {{
        e.preventDefault();
        return false;
    }});

    document.addEventListener('touchstart', function() {{}}, {{passive: true}});

    window.addEventListener('message', function(e) {{
        if (e.data && e.data.type) {{
            {ns}.handleGameEvent(JSON.stringify(e.data));
        }}
    }});

    if (!document.fullscreenEnabled) {{
        document.fullscreenEnabled = true;
        root.requestFullscreen = function() {{
            {ns}.requestFullscreen();
        }};
        document.exitFullscreen = function() {{
            {ns}.exitFullscreen();
        }};
    }}
}})();"#,
        ns = namespace
    )
}

/// Self-contained fallback page. No external resources.
pub const FALLBACK_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
            font-family: sans-serif;
            display: flex;
            align-items: center;
            justify-content: center;
            height: 100vh;
            margin: 0;
            text-align: center;
        }
        .error-container { padding: 20px; }
        h1 { font-size: 2em; margin-bottom: 10px; }
        p { font-size: 1.2em; opacity: 0.9; }
        button {
            background: white;
            color: #667eea;
            border: none;
            padding: 12px 30px;
            font-size: 1.1em;
            border-radius: 25px;
            margin-top: 20px;
            cursor: pointer;
        }
    </style>
</head>
<body>
    <div class="error-container">
        <h1>Loading Failed</h1>
        <p>Game loading encountered an issue</p>
        <button onclick="location.reload()">Reload</button>
    </div>
</body>
</html>
"#;
