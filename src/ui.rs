use crate::auth::AuthUser;

pub fn render_index(user: Option<&AuthUser>) -> String {
    let (signed_in, name) = match user {
        Some(user) => ("true", escape_html(user.display_name())),
        None => ("false", String::new()),
    };
    INDEX_HTML
        .replace("{{SIGNED_IN}}", signed_in)
        .replace("{{USER}}", &name)
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="uk" data-theme="dark">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Звички</title>
  <style>
    :root {
      --spacing-multiplier: 1.1;
      --cell-size-multiplier: 0.8;
      --cell-gap-multiplier: 0.1;
      --cell: calc(32px * var(--cell-size-multiplier));
      --gap: calc(10px * var(--cell-gap-multiplier));
    }

    [data-theme="dark"] {
      --bg: #111827;
      --card: #1f2937;
      --ink: #f3f4f6;
      --muted: #9ca3af;
      --line: #374151;
    }

    [data-theme="light"] {
      --bg: #f8fafc;
      --card: #ffffff;
      --ink: #1f2937;
      --muted: #6b7280;
      --line: #e5e7eb;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: calc(24px * var(--spacing-multiplier));
    }

    .card {
      background: var(--card);
      border-radius: 16px;
      padding: calc(20px * var(--spacing-multiplier));
      margin: 0 auto;
      max-width: 1100px;
      overflow-x: auto;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
      margin-bottom: 16px;
    }

    table {
      border-collapse: separate;
      border-spacing: var(--gap);
    }

    th {
      color: var(--muted);
      font-weight: 500;
      font-size: 0.8rem;
    }

    th.today {
      color: var(--ink);
      font-weight: 700;
    }

    th.week-separator,
    td.week-separator {
      border-left: 1px solid var(--line);
    }

    td.habit-name {
      white-space: nowrap;
      padding-right: 12px;
      cursor: pointer;
    }

    .swatch {
      display: inline-block;
      width: 10px;
      height: 10px;
      border-radius: 50%;
      margin-right: 6px;
    }

    .cell {
      width: var(--cell);
      height: var(--cell);
      border-radius: 6px;
      cursor: pointer;
      background: var(--line);
    }

    .cell.failed {
      background: #ef4444;
    }

    .cell.not-planned {
      background: repeating-linear-gradient(45deg, var(--line), var(--line) 4px, transparent 4px, transparent 8px);
    }

    dialog {
      background: var(--card);
      color: var(--ink);
      border: 1px solid var(--line);
      border-radius: 12px;
    }

    dialog label {
      display: block;
      margin: 8px 0;
    }

    .hidden {
      display: none;
    }

    #status {
      color: var(--muted);
      min-height: 1.2em;
    }
  </style>
</head>
<body data-signed-in="{{SIGNED_IN}}">
  <section id="auth-view" class="card hidden">
    <h1>Трекер звичок</h1>
    <form id="sign-in">
      <label>Ідентифікатор <input id="user-id" required /></label>
      <label>Email <input id="email" type="email" /></label>
      <button type="submit">Увійти</button>
    </form>
  </section>

  <section id="app-view" class="card hidden">
    <header>
      <h1>Привіт, {{USER}}!</h1>
      <div>
        <button id="add-habit">+ Звичка</button>
        <button id="open-settings">Налаштування</button>
        <button id="sign-out">Вийти</button>
      </div>
    </header>
    <table>
      <thead>
        <tr id="month-headers-row"><th></th></tr>
        <tr id="day-headers-row"><th></th></tr>
      </thead>
      <tbody id="habits-tbody"></tbody>
    </table>
    <p id="status"></p>
  </section>

  <dialog id="habit-dialog">
    <form method="dialog" id="habit-form">
      <label>Назва <input id="habit-name" required /></label>
      <label>Колір <input id="habit-color" type="color" /></label>
      <menu>
        <button value="save">Зберегти</button>
        <button value="delete" id="delete-habit">Видалити</button>
        <button value="cancel">Скасувати</button>
      </menu>
    </form>
  </dialog>

  <dialog id="settings-dialog">
    <form method="dialog" id="settings-form">
      <label>Тема
        <select name="theme"><option value="dark">Темна</option><option value="light">Світла</option></select>
      </label>
      <label>Відступи <input name="spacing" type="range" min="0.5" max="2" step="0.1" /></label>
      <label>Днів <input name="daysCount" type="range" min="7" max="30" step="1" /></label>
      <label>Розмір клітинки <input name="cellSize" type="range" min="0.7" max="1.5" step="0.1" /></label>
      <label>Проміжок <input name="cellGap" type="range" min="0" max="1" step="0.1" /></label>
      <menu>
        <button value="save">Зберегти</button>
        <button value="defaults">Скинути</button>
        <button value="cancel">Скасувати</button>
      </menu>
    </form>
  </dialog>

  <script>
    const signedIn = document.body.dataset.signedIn === 'true';
    const statusEl = document.getElementById('status');
    const habitDialog = document.getElementById('habit-dialog');
    const settingsDialog = document.getElementById('settings-dialog');
    const settingsForm = document.getElementById('settings-form');
    let editingId = null;

    const api = async (method, url, body) => {
      const response = await fetch(url, {
        method,
        headers: body ? { 'Content-Type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined,
      });
      if (!response.ok) {
        throw new Error(await response.text());
      }
      return response.status === 204 || response.status === 202 ? null : response.json();
    };

    const report = (error) => {
      statusEl.textContent = error ? error.message : '';
    };

    const applySettings = (settings) => {
      const root = document.documentElement;
      root.dataset.theme = settings.theme;
      root.style.setProperty('--spacing-multiplier', settings.spacing);
      root.style.setProperty('--cell-size-multiplier', settings.cellSize);
      root.style.setProperty('--cell-gap-multiplier', settings.cellGap);
    };

    const paint = (grid) => {
      applySettings(grid.settings);

      const months = document.getElementById('month-headers-row');
      months.replaceChildren(document.createElement('th'));
      grid.months.forEach((month) => {
        const th = document.createElement('th');
        th.colSpan = month.span;
        th.textContent = month.label;
        months.appendChild(th);
      });

      const days = document.getElementById('day-headers-row');
      days.replaceChildren(document.createElement('th'));
      grid.days.forEach((day) => {
        const th = document.createElement('th');
        th.textContent = day.day_number;
        th.classList.toggle('today', day.is_today);
        th.classList.toggle('week-separator', day.is_week_start);
        days.appendChild(th);
      });

      const tbody = document.getElementById('habits-tbody');
      tbody.replaceChildren();
      grid.rows.forEach((row) => {
        const tr = document.createElement('tr');
        const name = document.createElement('td');
        name.className = 'habit-name';
        const swatch = document.createElement('span');
        swatch.className = 'swatch';
        swatch.style.background = row.color;
        name.append(swatch, row.name);
        name.onclick = () => openHabitDialog(row);
        tr.appendChild(name);

        row.cells.forEach((cell, index) => {
          const td = document.createElement('td');
          td.classList.toggle('week-separator', grid.days[index].is_week_start);
          const div = document.createElement('div');
          div.className = `cell ${cell.status}`;
          if (cell.fill_color) {
            div.style.background = cell.fill_color;
          }
          div.onclick = () => toggle(row.id, cell.date);
          td.appendChild(div);
          tr.appendChild(td);
        });
        tbody.appendChild(tr);
      });
    };

    const refresh = async () => {
      try {
        paint(await api('GET', '/api/grid'));
        report(null);
      } catch (error) {
        report(error);
      }
    };

    const toggle = async (id, date) => {
      try {
        await api('POST', `/api/habits/${id}/days/${date}/toggle`);
        await refresh();
      } catch (error) {
        report(error);
      }
    };

    const openHabitDialog = async (row) => {
      editingId = row ? row.id : null;
      document.getElementById('delete-habit').classList.toggle('hidden', !row);
      document.getElementById('habit-name').value = row ? row.name : '';
      let color = row ? row.color : null;
      if (!row) {
        const suggestion = await api('GET', '/api/colors/next').catch(() => ({ color: null }));
        color = suggestion.color;
      }
      document.getElementById('habit-color').value = color || '#3b82f6';
      habitDialog.showModal();
    };

    habitDialog.addEventListener('close', async () => {
      const action = habitDialog.returnValue;
      const name = document.getElementById('habit-name').value;
      const color = document.getElementById('habit-color').value;
      try {
        if (action === 'save' && editingId === null) {
          await api('POST', '/api/habits', { name, color });
        } else if (action === 'save') {
          await api('PATCH', `/api/habits/${editingId}`, { name, color });
        } else if (action === 'delete' && confirm('Ви впевнені, що хочете видалити цю звичку?')) {
          await api('DELETE', `/api/habits/${editingId}`);
        }
        await refresh();
      } catch (error) {
        report(error);
      }
    });

    const readSettingsForm = () => ({
      theme: settingsForm.theme.value,
      spacing: parseFloat(settingsForm.spacing.value),
      daysCount: parseInt(settingsForm.daysCount.value, 10),
      cellSize: parseFloat(settingsForm.cellSize.value),
      cellGap: parseFloat(settingsForm.cellGap.value),
    });

    const fillSettingsForm = (settings) => {
      settingsForm.theme.value = settings.theme;
      settingsForm.spacing.value = settings.spacing;
      settingsForm.daysCount.value = settings.daysCount;
      settingsForm.cellSize.value = settings.cellSize;
      settingsForm.cellGap.value = settings.cellGap;
    };

    const onSettingsInput = async (event) => {
      const field = event.target.name;
      const raw = event.target.value;
      const value = field === 'theme' ? raw : field === 'daysCount' ? parseInt(raw, 10) : parseFloat(raw);
      try {
        const balanced = await api('POST', '/api/settings/balance', {
          draft: readSettingsForm(),
          change: { field, value },
        });
        fillSettingsForm(balanced);
        paint(await api('POST', '/api/settings/preview', balanced));
      } catch (error) {
        report(error);
      }
    };

    settingsForm.addEventListener('input', onSettingsInput);

    document.getElementById('open-settings').onclick = async () => {
      const { committed } = await api('GET', '/api/settings');
      fillSettingsForm(committed);
      settingsDialog.showModal();
    };

    settingsDialog.addEventListener('close', async () => {
      try {
        if (settingsDialog.returnValue === 'save') {
          await api('PUT', '/api/settings', readSettingsForm());
        } else if (settingsDialog.returnValue === 'defaults') {
          await api('POST', '/api/settings/defaults');
        } else {
          await api('DELETE', '/api/settings/preview');
        }
        await refresh();
      } catch (error) {
        report(error);
      }
    });

    document.getElementById('add-habit').onclick = () => openHabitDialog(null);

    document.getElementById('sign-out').onclick = async () => {
      await api('DELETE', '/api/auth/session');
      window.location.href = '/';
    };

    document.getElementById('sign-in').addEventListener('submit', async (event) => {
      event.preventDefault();
      await api('POST', '/api/auth/session', {
        user_id: document.getElementById('user-id').value,
        email: document.getElementById('email').value || null,
      });
      for (let attempt = 0; attempt < 20; attempt += 1) {
        const response = await fetch('/api/session');
        if (response.ok) {
          window.location.reload();
          return;
        }
        await new Promise((resolve) => setTimeout(resolve, 100));
      }
    });

    document.getElementById(signedIn ? 'app-view' : 'auth-view').classList.remove('hidden');
    if (signedIn) {
      refresh();
    }
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_out_page_has_no_user() {
        let page = render_index(None);
        assert!(page.contains(r#"data-signed-in="false""#));
        assert!(!page.contains("{{USER}}"));
    }

    #[test]
    fn user_name_is_escaped() {
        let user = AuthUser {
            id: "u-1".to_string(),
            email: Some("<b>@example.com".to_string()),
        };
        let page = render_index(Some(&user));
        assert!(page.contains(r#"data-signed-in="true""#));
        assert!(page.contains("&lt;b&gt;@example.com"));
        assert!(!page.contains("<b>@example.com"));
    }
}
