pub const VIEWER_HTML: &str = r###"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <meta name="theme-color" content="#081427" />
  <title>Fleetview Map</title>
  <style>
    :root{
      --bg-a:#050913;
      --bg-b:#081325;
      --ice:#e6fbff;
      --teal:#6ff8ff;
      --blue:#68c7ff;
      --panel:#0b1a2dcc;
      --panel-edge:#73c7ff55;
      --muted:#8aa3be;
      --ok:#4df5bf;
      --warn:#ffd06b;
      --dock-w:min(300px, 26vw);
      --command-h:86px;
      --screen-pad:12px;
    }
    *{box-sizing:border-box;margin:0;padding:0}
    html,body{width:100%;height:100%;overflow:hidden}
    body{
      font-family:Inter,system-ui,sans-serif;
      color:var(--ice);
      background:linear-gradient(165deg,var(--bg-b) 0%,var(--bg-a) 100%);
    }
    .layout{position:relative;width:100vw;height:100vh}
    .topbar{
      position:absolute;left:var(--screen-pad);right:var(--screen-pad);top:var(--screen-pad);
      height:54px;display:flex;gap:12px;align-items:center;justify-content:space-between;
      padding:10px 12px;border:1px solid var(--panel-edge);border-radius:14px;
      background:linear-gradient(160deg,#0c223b 0%, #081427 100%);
      z-index:50;
    }
    .brand{display:flex;align-items:center;gap:10px}
    .sig{width:10px;height:10px;border-radius:3px;background:linear-gradient(160deg,var(--teal),var(--blue))}
    .brand h1{font-size:14px;letter-spacing:.7px}
    .brand .sub{font-size:11px;color:var(--muted)}
    .pill{display:flex;align-items:center;gap:8px;font-size:12px;color:var(--muted)}
    .dot{width:8px;height:8px;border-radius:99px;background:var(--warn)}
    .dot.ok{background:var(--ok)}
    .btn{
      border:1px solid #4f799f;background:#0b1b30;color:var(--ice);
      border-radius:10px;padding:6px 10px;font-weight:600;cursor:pointer;
    }
    .btn:hover{border-color:#8de7ff}
    .btn.on{border-color:var(--teal);color:var(--teal)}
    .dock{
      position:absolute;right:var(--screen-pad);
      top:calc(var(--screen-pad) + 64px);bottom:calc(var(--screen-pad) + var(--command-h));
      width:var(--dock-w);padding:10px;border:1px solid var(--panel-edge);border-radius:16px;
      background:var(--panel);overflow:auto;z-index:40;
    }
    .dock h2{font-size:13px;letter-spacing:.6px;margin-bottom:10px}
    .card{
      border:1px solid #5fa5d655;border-radius:14px;background:#081427dd;
      padding:10px;margin-bottom:10px;font-size:12px;line-height:1.5;
    }
    .viewport{
      position:absolute;left:var(--screen-pad);
      right:calc(var(--screen-pad) + var(--dock-w) + 12px);
      top:calc(var(--screen-pad) + 64px);bottom:calc(var(--screen-pad) + var(--command-h));
      border-radius:18px;border:1px solid var(--panel-edge);overflow:hidden;z-index:10;
    }
    #mapCanvas{width:100%;height:100%;display:block;cursor:grab}
    #mapCanvas.dragging{cursor:grabbing}
    .commandbar{
      position:absolute;left:var(--screen-pad);right:var(--screen-pad);
      bottom:var(--screen-pad);height:calc(var(--command-h) - 12px);
      border:1px solid var(--panel-edge);border-radius:18px;background:#0c223bcc;
      padding:12px;display:flex;align-items:center;gap:10px;z-index:45;
    }
    .commandbar .readout{margin-left:auto;font-size:12px;color:var(--muted);font-family:ui-monospace,monospace}
    @media (max-width: 980px){
      .dock{display:none}
      .viewport{right:var(--screen-pad)}
    }
  </style>
</head>
<body>
  <div class="layout">
    <header class="topbar">
      <div class="brand">
        <div class="sig"></div>
        <div>
          <h1>FLEETVIEW</h1>
          <div class="sub">Agent map (local)</div>
        </div>
      </div>
      <div class="pill"><span id="connDot" class="dot"></span><span id="connText">connecting</span></div>
    </header>

    <main class="viewport">
      <canvas id="mapCanvas"></canvas>
    </main>

    <aside class="dock">
      <h2>Details</h2>
      <div id="panel.details">waiting</div>
    </aside>

    <footer class="commandbar">
      <button id="skipBtn" class="btn" type="button">|&lt;</button>
      <button id="playBtn" class="btn" type="button">play</button>
      <span id="panel.transport" class="readout">-</span>
      <button id="zoomOutBtn" class="btn" type="button">-</button>
      <button id="zoomInBtn" class="btn" type="button">+</button>
      <button id="resetBtn" class="btn" type="button">reset</button>
      <button id="focusBtn" class="btn" type="button">focus</button>
      <button id="labelsBtn" class="btn on" type="button">labels</button>
      <button id="pathsBtn" class="btn on" type="button">paths</button>
      <button id="areasBtn" class="btn on" type="button">areas</button>
      <span id="panel.bottom.bar" class="readout">100%</span>
    </footer>
  </div>

  <script>
  (function(){
    const $ = (id) => document.getElementById(id);
    const canvas = $("mapCanvas");
    const ctx = canvas.getContext("2d");
    const images = new Map();
    let css = { w: 0, h: 0, dpr: 1 };
    let view = null;
    let drawnGeneration = -1;
    let frameQueued = false;
    let inflight = false;

    const rgba = (c) => `rgba(${c[0]},${c[1]},${c[2]},${c[3] / 255})`;

    async function api(method, path, body){
      const r = await fetch(path, {
        method,
        cache: "no-store",
        headers: body === undefined ? {} : { "content-type": "application/json" },
        body: body === undefined ? undefined : JSON.stringify(body),
      });
      if (!r.ok) throw new Error(`${path}: ${r.status}`);
      return r.json();
    }

    function applyView(v){
      if (!v) return;
      view = v;
      $("playBtn").textContent = v.playback.playing ? "pause" : "play";
      $("labelsBtn").classList.toggle("on", v.flags.show_labels);
      $("pathsBtn").classList.toggle("on", v.flags.show_paths);
      $("areasBtn").classList.toggle("on", v.flags.show_areas);
      if (v.generation !== drawnGeneration) requestFrame();
    }

    async function refreshPanel(){
      const u = await api("GET", "/api/panel");
      for (const p of u.patches || []){
        const t = document.getElementById(p.target);
        if (t && (p.swap === "replace" || !p.swap)) t.innerHTML = p.html || "";
      }
    }

    function resize(){
      const r = canvas.getBoundingClientRect();
      css = { w: Math.max(1, r.width), h: Math.max(1, r.height), dpr: Math.max(1, Math.min(2, window.devicePixelRatio || 1)) };
      canvas.width = Math.floor(css.w * css.dpr);
      canvas.height = Math.floor(css.h * css.dpr);
      requestFrame(true);
    }

    // Coalesce redraw requests into one fetch per animation frame.
    function requestFrame(force){
      if (force) drawnGeneration = -1;
      if (frameQueued) return;
      frameQueued = true;
      requestAnimationFrame(fetchFrame);
    }

    async function fetchFrame(){
      frameQueued = false;
      if (inflight){ requestFrame(); return; }
      inflight = true;
      try{
        const gen = view ? view.generation : -1;
        const list = await api("GET", `/api/frame?width=${css.w}&height=${css.h}&dpr=${css.dpr}`);
        drawnGeneration = gen;
        draw(list);
        refreshPanel().catch(() => {});
      }catch(_e){
      }finally{
        inflight = false;
      }
    }

    function mapImage(id){
      let img = images.get(id);
      if (img) return img;
      img = new Image();
      img.onload = () => requestFrame(true);
      img.onerror = () => { api("POST", "/api/background/fallback").then(applyView).catch(() => {}); };
      img.src = "/api/map-image";
      images.set(id, img);
      return img;
    }

    function draw(list){
      ctx.setTransform(1, 0, 0, 1, 0, 0);
      for (const batch of list.layers){
        for (const c of batch.commands){
          switch (c.op){
            case "clear":
              ctx.fillStyle = rgba(c.color);
              ctx.fillRect(0, 0, canvas.width, canvas.height);
              break;
            case "image": {
              const img = mapImage(c.id);
              if (img.complete && img.naturalWidth) ctx.drawImage(img, c.x, c.y, c.w, c.h);
              break;
            }
            case "fill_rect":
              ctx.fillStyle = rgba(c.color);
              ctx.fillRect(c.x, c.y, c.w, c.h);
              break;
            case "stroke_rect":
              ctx.strokeStyle = rgba(c.color);
              ctx.lineWidth = c.width;
              ctx.strokeRect(c.x, c.y, c.w, c.h);
              break;
            case "line":
              ctx.strokeStyle = rgba(c.color);
              ctx.lineWidth = c.width;
              ctx.beginPath();
              ctx.moveTo(c.from[0], c.from[1]);
              ctx.lineTo(c.to[0], c.to[1]);
              ctx.stroke();
              break;
            case "polyline":
              ctx.strokeStyle = rgba(c.color);
              ctx.lineWidth = c.width;
              ctx.setLineDash(c.dash || []);
              ctx.beginPath();
              c.points.forEach((p, i) => i ? ctx.lineTo(p[0], p[1]) : ctx.moveTo(p[0], p[1]));
              ctx.stroke();
              ctx.setLineDash([]);
              break;
            case "fill_circle":
              ctx.fillStyle = rgba(c.color);
              ctx.beginPath();
              ctx.arc(c.center[0], c.center[1], c.radius, 0, Math.PI * 2);
              ctx.fill();
              break;
            case "stroke_circle":
              ctx.strokeStyle = rgba(c.color);
              ctx.lineWidth = c.width;
              ctx.beginPath();
              ctx.arc(c.center[0], c.center[1], c.radius, 0, Math.PI * 2);
              ctx.stroke();
              break;
            case "text": {
              ctx.font = `600 ${c.size}px Inter, system-ui, sans-serif`;
              ctx.textAlign = c.align;
              ctx.textBaseline = "middle";
              if (c.plate){
                const m = ctx.measureText(c.text);
                const pad = c.size * 0.3;
                const x0 = c.align === "center" ? c.at[0] - m.width / 2 : c.at[0];
                ctx.fillStyle = rgba(c.plate);
                ctx.fillRect(x0 - pad, c.at[1] - c.size * 0.7, m.width + pad * 2, c.size * 1.4);
              }
              ctx.fillStyle = rgba(c.color);
              ctx.fillText(c.text, c.at[0], c.at[1]);
              break;
            }
          }
        }
      }
    }

    function pointer(kind, e, extra){
      const r = canvas.getBoundingClientRect();
      const event = kind === "leave"
        ? { kind }
        : Object.assign({ kind, x: e.clientX - r.left, y: e.clientY - r.top }, extra || {});
      return api("POST", "/api/input", { event, canvas: { width: css.w, height: css.h, dpr: css.dpr } })
        .then((reply) => {
          applyView(reply.view);
          if (reply.hover_changed || reply.selection_changed) refreshPanel().catch(() => {});
        })
        .catch(() => {});
    }

    // Pointer moves are coalesced: only the latest pending move is sent.
    let pendingMove = null;
    let moveBusy = false;
    function flushMove(){
      if (moveBusy || !pendingMove) return;
      const e = pendingMove;
      pendingMove = null;
      moveBusy = true;
      pointer("move", e).finally(() => { moveBusy = false; flushMove(); });
    }

    canvas.addEventListener("mousedown", (e) => {
      canvas.classList.add("dragging");
      pointer("down", e);
    });
    canvas.addEventListener("mousemove", (e) => { pendingMove = e; flushMove(); });
    window.addEventListener("mouseup", (e) => {
      canvas.classList.remove("dragging");
      pointer("up", e);
    });
    canvas.addEventListener("click", (e) => pointer("click", e));
    canvas.addEventListener("mouseleave", (e) => pointer("leave", e));
    canvas.addEventListener("wheel", (e) => {
      e.preventDefault();
      pointer("wheel", e, { delta_y: e.deltaY });
    }, { passive: false });

    const post = (path, body) => () => api("POST", path, body).then(applyView).catch(() => {});
    $("playBtn").addEventListener("click", post("/api/playback", { command: "toggle" }));
    $("skipBtn").addEventListener("click", post("/api/playback", { command: "skip_to_start" }));
    $("zoomInBtn").addEventListener("click", post("/api/view/zoom", { zoom_in: true }));
    $("zoomOutBtn").addEventListener("click", post("/api/view/zoom", { zoom_in: false }));
    $("resetBtn").addEventListener("click", post("/api/view/reset"));
    $("focusBtn").addEventListener("click", post("/api/view/focus"));

    function toggleFlag(name){
      return () => {
        if (!view) return;
        const flags = Object.assign({}, view.flags, { [name]: !view.flags[name] });
        api("PUT", "/api/flags", flags).then(applyView).catch(() => {});
      };
    }
    $("labelsBtn").addEventListener("click", toggleFlag("show_labels"));
    $("pathsBtn").addEventListener("click", toggleFlag("show_paths"));
    $("areasBtn").addEventListener("click", toggleFlag("show_areas"));

    // Playback and feed updates happen server-side; poll the generation.
    async function viewLoop(){
      for(;;){
        try{
          applyView(await api("GET", "/api/view"));
          $("connDot").classList.add("ok");
          $("connText").textContent = "online";
        }catch(_e){
          $("connDot").classList.remove("ok");
          $("connText").textContent = "offline";
        }
        await new Promise(res => setTimeout(res, view && view.playback.playing ? 100 : 600));
      }
    }

    window.addEventListener("resize", () => resize());
    resize();
    viewLoop();
  })();
  </script>
</body>
</html>
"###;
